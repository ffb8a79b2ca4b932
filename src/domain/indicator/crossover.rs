//! Crossover detection between two aligned series.
//!
//! `crossed_up` at i: series[i-1] <= reference[i-1] and series[i] > reference[i].
//! `crossed_down` at i: series[i-1] >= reference[i-1] and series[i] < reference[i].
//! Both are false at index 0 and when i is out of range for either series.

pub fn crossed_up(series: &[f64], reference: &[f64], i: usize) -> bool {
    if i == 0 || i >= series.len() || i >= reference.len() {
        return false;
    }
    series[i - 1] <= reference[i - 1] && series[i] > reference[i]
}

pub fn crossed_down(series: &[f64], reference: &[f64], i: usize) -> bool {
    if i == 0 || i >= series.len() || i >= reference.len() {
        return false;
    }
    series[i - 1] >= reference[i - 1] && series[i] < reference[i]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossed_up_true() {
        assert!(crossed_up(&[9.0, 11.0], &[10.0, 10.0], 1));
    }

    #[test]
    fn crossed_up_from_touching() {
        assert!(crossed_up(&[10.0, 11.0], &[10.0, 10.0], 1));
    }

    #[test]
    fn crossed_up_false_when_already_above() {
        assert!(!crossed_up(&[11.0, 12.0], &[10.0, 10.0], 1));
    }

    #[test]
    fn crossed_up_false_when_only_touching_now() {
        assert!(!crossed_up(&[9.0, 10.0], &[10.0, 10.0], 1));
    }

    #[test]
    fn crossed_down_true() {
        assert!(crossed_down(&[11.0, 9.0], &[10.0, 10.0], 1));
        assert!(crossed_down(&[10.0, 9.0], &[10.0, 10.0], 1));
    }

    #[test]
    fn crossed_down_false_when_already_below() {
        assert!(!crossed_down(&[9.0, 8.0], &[10.0, 10.0], 1));
    }

    #[test]
    fn index_zero_and_out_of_range() {
        assert!(!crossed_up(&[9.0, 11.0], &[10.0, 10.0], 0));
        assert!(!crossed_down(&[11.0, 9.0], &[10.0, 10.0], 0));
        assert!(!crossed_up(&[9.0, 11.0], &[10.0], 1));
        assert!(!crossed_down(&[11.0, 9.0], &[10.0, 10.0], 5));
    }

    #[test]
    fn crossing_against_moving_reference() {
        let price = [100.0, 102.0, 101.0, 98.0];
        let ma = [101.0, 101.5, 101.5, 100.0];
        assert!(crossed_up(&price, &ma, 1));
        assert!(!crossed_up(&price, &ma, 2));
        assert!(crossed_down(&price, &ma, 2));
        assert!(!crossed_down(&price, &ma, 3));
    }
}
