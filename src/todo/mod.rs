pub mod item;
pub mod view;

pub use item::{CreateTodoInput, Snapshot, TodoItem};
pub use view::TodoView;
