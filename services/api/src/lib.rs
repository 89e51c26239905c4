pub mod handlers;
pub mod routes;

#[cfg(test)]
mod tests;
