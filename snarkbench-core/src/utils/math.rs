pub trait Math {
    fn log_2(self) -> usize;
}

impl Math for usize {
    /// Ceiling of log2; exact for powers of two.
    fn log_2(self) -> usize {
        assert_ne!(self, 0);

        if self.is_power_of_two() {
            (1usize.leading_zeros() - self.leading_zeros()) as usize
        } else {
            (0usize.leading_zeros() - self.leading_zeros()) as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Math;

    #[test]
    fn log_2_rounds_up() {
        assert_eq!(1usize.log_2(), 0);
        assert_eq!(2usize.log_2(), 1);
        assert_eq!(5usize.log_2(), 3);
        assert_eq!((1usize << 24).log_2(), 24);
        assert_eq!(((1usize << 24) + 3).log_2(), 25);
    }
}
