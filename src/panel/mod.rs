pub mod sort;
pub mod state;

pub use sort::SortColumn;
pub use state::{PanelState, SelectOptions};
