//! The seven search routines. Each takes the matrix by shared reference and
//! builds a fresh [`TraversalResult`](crate::TraversalResult), including the
//! reconstructed path, before returning.

mod bellman_ford;
mod bfs;
mod desopo_pape;
mod dfs;
mod dijkstra;
mod floyd_warshall;

pub use bellman_ford::bellman_ford;
pub use bfs::bfs;
pub use desopo_pape::desopo_pape;
pub use dfs::dfs;
pub use dijkstra::{dijkstra_array, dijkstra_queue};
pub use floyd_warshall::floyd_warshall;
