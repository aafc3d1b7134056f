//! IMAP command handlers for the fake server.
//!
//! Each handler lives in its own module and processes a single IMAP
//! command (LOGIN, LOGOUT, SELECT, SEARCH, FETCH, STORE). Messages are
//! addressed by sequence number, which is what the client under test
//! uses.

mod search;

pub use fetch::handle_fetch;
pub use login::handle_login;
pub use logout::handle_logout;
pub use search::handle_search;
pub use select::handle_select;
pub use store::{StoreArgs, handle_store};
