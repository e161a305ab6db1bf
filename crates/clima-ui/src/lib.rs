pub mod atmosphere;
pub mod carousel;
pub mod dashboard;
pub mod debounce;
pub mod error_mapping;
pub mod map;
pub mod page;
pub mod render;
pub mod services;
pub mod state;
pub mod storage;

pub use atmosphere::{Atmosphere, Canvas, DisplayList, Scene};
pub use dashboard::{Dashboard, UiEvent};
pub use map::{HeadlessMap, MapAdapter, MapWidget};
pub use page::{Page, Region, ToastKind};
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
