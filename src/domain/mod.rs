pub mod error;
pub mod session;
pub mod test_case;
