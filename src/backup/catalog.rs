//! Ordering and retention selection over the set of stored backup names.

use crate::backup::name::{self, NameError};

/// Sorts backup names by timestamp, newest first.
///
/// Every name must parse under the naming scheme; a single malformed entry
/// fails the whole listing so that retention never acts on a partial
/// ordering. The sort is stable, same-instant entries keep their listing
/// order.
pub fn order(names: Vec<String>) -> Result<Vec<String>, NameError> {
    let mut keyed = names
        .into_iter()
        .map(|n| name::parse_timestamp(&n).map(|t| (t, n)))
        .collect::<Result<Vec<_>, _>>()?;

    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));

    Ok(keyed.into_iter().map(|(_, n)| n).collect())
}

/// Returns the ordered names beyond the `retention` newest ones, oldest last.
///
/// With `retention == 0` this is the whole catalog; whether that means "keep
/// everything" or "delete everything" is decided by the caller's
/// [`PrunePolicy`](crate::client::PrunePolicy).
pub fn expired(ordered: &[String], retention: usize) -> &[String] {
    if ordered.len() <= retention {
        &[]
    } else {
        &ordered[retention..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(timestamps: &[&str]) -> Vec<String> {
        timestamps
            .iter()
            .map(|t| format!("test_{t}.backup"))
            .collect()
    }

    #[test]
    fn order_is_descending() {
        let names = named(&[
            "2021-01-01T00:00:00+00:00",
            "2021-03-01T00:00:00+00:00",
            "2021-02-01T00:00:00+00:00",
        ]);

        let ordered = order(names).unwrap();
        assert_eq!(
            ordered,
            named(&[
                "2021-03-01T00:00:00+00:00",
                "2021-02-01T00:00:00+00:00",
                "2021-01-01T00:00:00+00:00",
            ])
        );
    }

    #[test]
    fn order_is_stable_on_ties() {
        let names = vec![
            "b_2021-01-01T00:00:00+00:00.backup".to_string(),
            "a_2021-01-01T00:00:00+00:00.backup".to_string(),
            "c_2021-01-01T00:00:00+00:00.backup".to_string(),
        ];

        assert_eq!(order(names.clone()).unwrap(), names);
    }

    #[test]
    fn order_fails_closed_on_malformed_entry() {
        let names = vec![
            "test_2021-01-01T00:00:00+00:00.backup".to_string(),
            "not-a-backup".to_string(),
        ];

        assert!(matches!(order(names), Err(NameError::InvalidName(_))));
    }

    #[test]
    fn expired_selects_the_oldest_beyond_retention() {
        let ordered = named(&[
            "2021-05-01T00:00:00+00:00",
            "2021-04-01T00:00:00+00:00",
            "2021-03-01T00:00:00+00:00",
            "2021-02-01T00:00:00+00:00",
            "2021-01-01T00:00:00+00:00",
        ]);

        assert_eq!(
            expired(&ordered, 3),
            &named(&["2021-02-01T00:00:00+00:00", "2021-01-01T00:00:00+00:00"])[..]
        );
    }

    #[test]
    fn expired_is_empty_at_or_below_retention() {
        let ordered = named(&["2021-01-01T00:00:00+00:00"]);

        assert!(expired(&ordered, 1).is_empty());
        assert!(expired(&ordered, 5).is_empty());
        assert!(expired(&[], 0).is_empty());
    }

    #[test]
    fn expired_with_zero_retention_is_everything() {
        let ordered = named(&["2021-02-01T00:00:00+00:00", "2021-01-01T00:00:00+00:00"]);

        assert_eq!(expired(&ordered, 0), &ordered[..]);
    }
}
