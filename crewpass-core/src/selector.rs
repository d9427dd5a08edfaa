use rand::seq::{index, SliceRandom};
use rand::Rng;

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("insufficient capacity: requested {requested}, available {available}")]
    InsufficientCapacity { requested: usize, available: usize },
}

/// Draw `count` distinct seats from `pool`, uniformly at random and without
/// replacement, in the order drawn. The caller supplies the random source;
/// production paths pass `rand::thread_rng()`, tests a seeded `StdRng`.
pub fn draw<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[String],
    count: usize,
) -> Result<Vec<String>, SelectionError> {
    if count > pool.len() {
        return Err(SelectionError::InsufficientCapacity {
            requested: count,
            available: pool.len(),
        });
    }

    let picked = index::sample(rng, pool.len(), count);
    Ok(picked.iter().map(|i| pool[i].clone()).collect())
}

/// Draw a single seat from `pool`.
pub fn draw_one<R: Rng + ?Sized>(rng: &mut R, pool: &[String]) -> Result<String, SelectionError> {
    pool.choose(rng)
        .cloned()
        .ok_or(SelectionError::InsufficientCapacity {
            requested: 1,
            available: 0,
        })
}
