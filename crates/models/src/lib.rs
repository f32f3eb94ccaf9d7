pub mod errors;
pub mod db;
pub mod retrieval_queue;

#[cfg(test)]
mod tests;
