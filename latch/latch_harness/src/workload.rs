//! CPU-bound workload used to keep a lock held for a measurable time.

/// Whether `n` is prime, by trial division.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }

    let mut divisor = 2;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 1;
    }
    true
}

/// The `n`-th prime (1-based), by counting up through the integers.
///
/// Deliberately naive: the running time grows with `n` and serves as the knob
/// for how long the handshake holder keeps its lock. `n == 0` returns 0.
pub fn nth_prime(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }

    let mut found = 0;
    let mut candidate = 1;
    while found < n {
        candidate += 1;
        if is_prime(candidate) {
            found += 1;
        }
    }
    candidate
}
