//! Sparse checkpoint schedule for trajectory snapshots.
//!
//! Dense early on, where the parameters move the most, and thinning out
//! geometrically afterwards.

pub fn is_checkpoint(i: usize) -> bool {
    i == 0
        || (i < 10 && i % 2 == 0)
        || (i < 50 && i % 5 == 0)
        || (i < 200 && i % 20 == 0)
        || i % 50 == 0
}

/// Denormalized parameters at one iteration.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Snapshot {
    pub iteration: usize,
    pub theta0: f64,
    pub theta1: f64,
}

#[cfg(test)]
mod tests {
    use super::is_checkpoint;

    #[test]
    fn test_checkpoints_below_fifty() {
        let picked: Vec<usize> = (0..50).filter(|&i| is_checkpoint(i)).collect();
        assert_eq!(picked, vec![0, 2, 4, 5, 6, 8, 10, 15, 20, 25, 30, 35, 40, 45]);
    }

    #[test]
    fn test_checkpoints_thin_out() {
        let picked: Vec<usize> = (50..500).filter(|&i| is_checkpoint(i)).collect();
        assert_eq!(
            picked,
            vec![50, 60, 80, 100, 120, 140, 150, 160, 180, 200, 250, 300, 350, 400, 450]
        );
    }
}
