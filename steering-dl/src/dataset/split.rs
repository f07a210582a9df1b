use super::Record;
use crate::common::*;

/// Disjoint training and validation subsets of the records.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplit {
    pub train: Vec<Record>,
    pub validation: Vec<Record>,
}

/// Randomly partitions the records into training and validation subsets.
///
/// The validation subset receives `ceil(validation_ratio * len)` records and
/// the training subset the rest.
pub fn train_validation_split<R>(
    mut records: Vec<Record>,
    validation_ratio: f64,
    rng: &mut R,
) -> Result<DatasetSplit>
where
    R: Rng + ?Sized,
{
    ensure!(
        (0.0..=1.0).contains(&validation_ratio),
        "validation_ratio must be in range [0, 1], but get {}",
        validation_ratio
    );

    let num_records = records.len();
    let num_validation = (num_records as f64 * validation_ratio).ceil() as usize;

    records.shuffle(rng);
    let validation = records.split_off(num_records - num_validation);

    Ok(DatasetSplit {
        train: records,
        validation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_records(num: usize) -> Vec<Record> {
        (0..num)
            .map(|index| Record {
                center: format!("center_{}.jpg", index).into(),
                left: format!("left_{}.jpg", index).into(),
                right: format!("right_{}.jpg", index).into(),
                steering: index as f64,
            })
            .collect()
    }

    fn sorted(records: impl IntoIterator<Item = Record>) -> Vec<Record> {
        records
            .into_iter()
            .sorted_by(|lhs, rhs| lhs.center.cmp(&rhs.center))
            .collect()
    }

    #[test]
    fn split_is_disjoint_and_complete() {
        let records = make_records(150);
        let mut rng = StdRng::from_entropy();

        let DatasetSplit { train, validation } =
            train_validation_split(records.clone(), 0.2, &mut rng).unwrap();
        assert_eq!(train.len(), 120);
        assert_eq!(validation.len(), 30);

        assert!(train.iter().all(|record| !validation.contains(record)));
        assert_eq!(sorted(train.into_iter().chain(validation)), sorted(records));
    }

    #[test]
    fn validation_size_rounds_up() {
        let mut rng = StdRng::seed_from_u64(7);
        let split = train_validation_split(make_records(7), 0.2, &mut rng).unwrap();
        assert_eq!(split.validation.len(), 2);
        assert_eq!(split.train.len(), 5);
    }

    #[test]
    fn same_seed_gives_same_split() {
        let records = make_records(20);
        let lhs = train_validation_split(records.clone(), 0.2, &mut StdRng::seed_from_u64(1)).unwrap();
        let rhs = train_validation_split(records, 0.2, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn empty_records_give_empty_subsets() {
        let split = train_validation_split(vec![], 0.2, &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(split.train.is_empty());
        assert!(split.validation.is_empty());
    }

    #[test]
    fn invalid_ratio_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(train_validation_split(make_records(3), 1.5, &mut rng).is_err());
        assert!(train_validation_split(make_records(3), -0.1, &mut rng).is_err());
    }
}
