// filemarks state managers
// The bookmark manager owns the bookmark forest and is the only mutation path.

pub mod bookmark_manager;
