mod fetch;
mod request;
mod token;

#[cfg(test)]
mod tests;

pub use fetch::{FetchedPage, RowPredicate, fetch_page};
pub use request::{FetchRequest, FetchResponse, execute};
pub use token::ResumeToken;
