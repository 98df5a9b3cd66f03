use proptest::prelude::*;
use sasrebin::{
    rebin, rebin3, rebin_measurement, AverageMode, BinPolicy, RebinError, Rebinner,
};

fn policy_strategy() -> impl Strategy<Value = BinPolicy> {
    prop_oneof![
        (0.1f64..30.0).prop_map(|w| BinPolicy::linear(w).unwrap()),
        (0.5f64..3.0).prop_map(|b| BinPolicy::logarithmic(b).unwrap()),
    ]
}

fn samples_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6f64..1.0e6, 0..400)
}

proptest! {
    #[test]
    fn test_linear_output_length(xs in samples_strategy(), width in 1usize..20) {
        prop_assume!(!xs.is_empty());
        let policy = BinPolicy::linear(width as f64).unwrap();
        let out = rebin(&xs, &policy, AverageMode::Simple);
        prop_assert_eq!(out.len(), xs.len().div_ceil(width));
    }

    #[test]
    fn test_every_sample_in_one_bin(xs in samples_strategy(), policy in policy_strategy()) {
        let sizes = policy.bin_sizes(xs.len());
        prop_assert_eq!(sizes.iter().sum::<usize>(), xs.len());
        prop_assert!(sizes.iter().all(|&size| size >= 1));

        let rebinner = Rebinner::new(policy, AverageMode::Simple);
        let concatenated: Vec<f64> = rebinner.bins(&xs).flatten().copied().collect();
        prop_assert_eq!(concatenated, xs.clone());

        let out = rebinner.rebin(&xs);
        prop_assert_eq!(out.len(), sizes.len());
        prop_assert!(out.len() <= xs.len());
        prop_assert_eq!(out.is_empty(), xs.is_empty());
    }

    #[test]
    fn test_bin_values_are_bin_averages(xs in samples_strategy(), policy in policy_strategy()) {
        let rebinner = Rebinner::new(policy, AverageMode::Square);
        let out = rebinner.rebin(&xs);
        for (value, bin) in out.iter().zip(rebinner.bins(&xs)) {
            let sum_sq = bin.iter().fold(0.0, |acc, x| acc + x * x);
            prop_assert_eq!(*value, sum_sq.sqrt() / bin.len() as f64);
        }
    }

    #[test]
    fn test_width_one_is_identity(xs in samples_strategy()) {
        let policy = BinPolicy::linear(1.0).unwrap();
        prop_assert_eq!(rebin(&xs, &policy, AverageMode::Simple), xs.clone());
        let abs: Vec<f64> = xs.iter().map(|x| x.abs()).collect();
        prop_assert_eq!(rebin(&xs, &policy, AverageMode::Square), abs);
    }

    #[test]
    fn test_channels_stay_aligned(xs in samples_strategy(), policy in policy_strategy()) {
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x).collect();
        let zs: Vec<f64> = xs.iter().map(|x| x.abs() + 1.0).collect();

        let (q, i, di) = rebin_measurement(&xs, &ys, &zs, &policy).unwrap();
        prop_assert_eq!(q.len(), i.len());
        prop_assert_eq!(i.len(), di.len());
        prop_assert_eq!(&di, &rebin(&zs, &policy, AverageMode::Square));

        let (a, b, c) = rebin3(&xs, &ys, &zs, &policy).unwrap();
        prop_assert_eq!(a, rebin(&xs, &policy, AverageMode::Simple));
        prop_assert_eq!(b, rebin(&ys, &policy, AverageMode::Simple));
        prop_assert_eq!(c, rebin(&zs, &policy, AverageMode::Simple));
    }
}

#[test]
fn test_invalid_names_fail_before_rebinning() {
    assert!(matches!(
        Rebinner::from_names("quadratic", 2.0, "simple"),
        Err(RebinError::InvalidPolicy(_))
    ));
    assert!(matches!(
        Rebinner::from_names("lin", 2.0, "weighted"),
        Err(RebinError::InvalidMode(_))
    ));
}

#[test]
fn test_reference_examples() {
    let lin2 = BinPolicy::linear(2.0).unwrap();
    assert_eq!(
        rebin(&[2.0, 4.0, 6.0, 8.0], &lin2, AverageMode::Simple),
        vec![3.0, 7.0]
    );
    assert_eq!(rebin(&[3.0, 4.0], &lin2, AverageMode::Square), vec![2.5]);
    assert_eq!(
        rebin(&[1.0, 2.0, 3.0, 4.0, 5.0], &lin2, AverageMode::Simple),
        vec![1.5, 3.5, 5.0]
    );

    // Bins {1}, {2, 3}, {4, 5, 6, 7}
    let log2 = BinPolicy::logarithmic(2.0).unwrap();
    assert_eq!(
        rebin(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], &log2, AverageMode::Simple),
        vec![1.0, 2.5, 5.5]
    );
}
