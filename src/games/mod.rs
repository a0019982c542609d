pub mod blackjack;
pub mod coinflip;
pub mod slots;
pub mod table;
pub mod types;

pub use blackjack::{hand_value, Phase, Rank, RoundView};
pub use coinflip::CoinFlip;
pub use slots::SlotMachine;
pub use table::BlackjackTable;
pub use types::*;
