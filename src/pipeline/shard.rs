// src/pipeline/shard.rs

//! Work partitioning for the worker pools.

/// Split `names` into `count` contiguous shards.
///
/// Every shard gets `len / count` names and the last one also takes the
/// remainder, so with fewer names than shards everything lands in the last
/// shard and the others stay empty.
pub fn partition_contiguous(names: &[String], count: usize) -> Vec<Vec<String>> {
    let count = count.max(1);
    let size = names.len() / count;

    (0..count)
        .map(|i| {
            let start = i * size;
            let end = if i + 1 == count {
                names.len()
            } else {
                start + size
            };
            names[start..end].to_vec()
        })
        .collect()
}

/// Split `names` into `count` shards whose sizes differ by at most one.
///
/// The remainder goes to the first shards.
pub fn partition_even(names: &[String], count: usize) -> Vec<Vec<String>> {
    let count = count.max(1);
    let size = names.len() / count;
    let remainder = names.len() % count;

    let mut shards = Vec::with_capacity(count);
    let mut start = 0;
    for i in 0..count {
        let end = start + size + usize::from(i < remainder);
        shards.push(names[start..end].to_vec());
        start = end;
    }
    shards
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("pkg{i}")).collect()
    }

    fn sizes(shards: &[Vec<String>]) -> Vec<usize> {
        shards.iter().map(Vec::len).collect()
    }

    #[test]
    fn test_contiguous_last_takes_remainder() {
        let shards = partition_contiguous(&names(10), 3);
        assert_eq!(sizes(&shards), vec![3, 3, 4]);
        assert_eq!(shards[0][0], "pkg0");
        assert_eq!(shards[2][3], "pkg9");
    }

    #[test]
    fn test_contiguous_fewer_names_than_shards() {
        let shards = partition_contiguous(&names(2), 5);
        assert_eq!(sizes(&shards), vec![0, 0, 0, 0, 2]);
    }

    #[test]
    fn test_even_remainder_to_first() {
        let shards = partition_even(&names(10), 3);
        assert_eq!(sizes(&shards), vec![4, 3, 3]);
        assert_eq!(shards[1][0], "pkg4");
    }

    #[test]
    fn test_partitions_cover_every_name_once() {
        for (n, k) in [(0, 3), (1, 1), (7, 2), (13, 4), (3, 8)] {
            let input = names(n);
            for shards in [partition_contiguous(&input, k), partition_even(&input, k)] {
                assert_eq!(shards.len(), k);
                let flat: Vec<String> = shards.concat();
                assert_eq!(flat, input);
            }
        }
    }

    #[test]
    fn test_zero_workers_treated_as_one() {
        assert_eq!(sizes(&partition_even(&names(4), 0)), vec![4]);
        assert_eq!(sizes(&partition_contiguous(&names(4), 0)), vec![4]);
    }
}
