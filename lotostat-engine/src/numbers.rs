//! Classification d'un numéro : parité, primalité, divisibilité, quadrant.

/// Aucune modalité ne tire au-delà de 60.
pub const PRIMES: [u8; 17] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59];

pub const MULTIPLE_DIVISORS: [u8; 5] = [2, 3, 4, 5, 6];

pub const QUADRANT_COUNT: usize = 4;

pub fn is_even(n: u8) -> bool {
    n % 2 == 0
}

pub fn is_prime(n: u8) -> bool {
    PRIMES.contains(&n)
}

pub fn is_multiple(n: u8, divisor: u8) -> bool {
    divisor != 0 && n % divisor == 0
}

/// Largeur entière d'un quadrant : `max_number / 4`.
pub fn quadrant_size(max_number: u8) -> u8 {
    (max_number / QUADRANT_COUNT as u8).max(1)
}

/// Index 0..=3 ; le dernier quadrant absorbe le reste (25 pour la Lotofácil).
pub fn quadrant_of(n: u8, max_number: u8) -> usize {
    let size = quadrant_size(max_number);
    (((n.max(1) - 1) / size) as usize).min(QUADRANT_COUNT - 1)
}

pub fn count_even(numbers: &[u8]) -> usize {
    numbers.iter().filter(|&&n| is_even(n)).count()
}

pub fn count_primes(numbers: &[u8]) -> usize {
    numbers.iter().filter(|&&n| is_prime(n)).count()
}

pub fn count_multiples(numbers: &[u8], divisor: u8) -> usize {
    numbers.iter().filter(|&&n| is_multiple(n, divisor)).count()
}

pub fn quadrant_counts(numbers: &[u8], max_number: u8) -> [usize; QUADRANT_COUNT] {
    let mut counts = [0usize; QUADRANT_COUNT];
    for &n in numbers {
        counts[quadrant_of(n, max_number)] += 1;
    }
    counts
}

pub fn sum(numbers: &[u8]) -> u32 {
    numbers.iter().map(|&n| n as u32).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primes_up_to_59() {
        let expected: Vec<u8> = (2..=60u8)
            .filter(|&n| (2..n).all(|d| n % d != 0))
            .collect();
        assert_eq!(PRIMES.to_vec(), expected);
        assert!(!is_prime(1));
        assert!(is_prime(59));
    }

    #[test]
    fn test_quadrants_lotofacil() {
        let max = 25;
        assert_eq!(quadrant_size(max), 6);
        assert_eq!(quadrant_of(1, max), 0);
        assert_eq!(quadrant_of(6, max), 0);
        assert_eq!(quadrant_of(7, max), 1);
        assert_eq!(quadrant_of(12, max), 1);
        assert_eq!(quadrant_of(13, max), 2);
        assert_eq!(quadrant_of(18, max), 2);
        assert_eq!(quadrant_of(19, max), 3);
        assert_eq!(quadrant_of(25, max), 3);
    }

    #[test]
    fn test_quadrants_mega_sena() {
        let max = 60;
        assert_eq!(quadrant_of(15, max), 0);
        assert_eq!(quadrant_of(16, max), 1);
        assert_eq!(quadrant_of(30, max), 1);
        assert_eq!(quadrant_of(45, max), 2);
        assert_eq!(quadrant_of(46, max), 3);
        assert_eq!(quadrant_of(60, max), 3);
    }

    #[test]
    fn test_counts() {
        let numbers = [2, 3, 6, 12, 25, 30];
        assert_eq!(count_even(&numbers), 4);
        assert_eq!(count_primes(&numbers), 2);
        assert_eq!(count_multiples(&numbers, 3), 4);
        assert_eq!(count_multiples(&numbers, 6), 3);
        assert_eq!(count_multiples(&numbers, 5), 2);
        assert_eq!(sum(&numbers), 78);
        assert_eq!(quadrant_counts(&numbers, 60), [4, 2, 0, 0]);
    }
}
