pub mod card_tile;
pub mod menu;
pub mod progress_bar;
