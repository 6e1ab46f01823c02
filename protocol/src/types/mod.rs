//! # Ledger Data Model
//!
//! The vocabulary shared by every stage of draft construction.
//!
//! ```text
//! address.rs — Address (20 bytes), ResourceId (32 bytes), Recipient
//! token.rs   — TokenId; `None` is the native asset
//! amount.rs  — Amount (u128) and its decimal-string serde adapter
//! utxo.rs    — OutPoint, Utxo
//! lock.rs    — LockSpec, the closed set of spending conditions
//! output.rs  — Output
//! ```

pub mod address;
pub mod amount;
pub mod lock;
pub mod output;
pub mod token;
pub mod utxo;

pub use address::{Address, AddressError, Recipient, ResourceId};
pub use amount::Amount;
pub use lock::{LockError, LockSpec};
pub use output::Output;
pub use token::TokenId;
pub use utxo::{OutPoint, Utxo};
