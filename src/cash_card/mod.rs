mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;
mod service;
mod store;

pub use self::core::{CashCard, CashCardId, CashCardRequest, create_cash_card_table};
pub use create_endpoint::create_cash_card_endpoint;
pub use delete_endpoint::delete_cash_card_endpoint;
pub use edit_endpoint::edit_cash_card_endpoint;
pub use get_endpoint::get_cash_card_endpoint;
pub use list_endpoint::list_cash_cards_endpoint;
pub use service::CashCardService;
pub use store::{CashCardStore, SQLiteCashCardStore};
