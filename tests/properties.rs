use proptest::prelude::*;

use gutprofile::abundance::AbundanceIndex;
use gutprofile::diversity::{chao1, shannon, simpson};
use gutprofile::reference::{AgeMarkers, YouthMarker};
use gutprofile::scoring::age_predict::{AgePredictor, MAX_BIOLOGICAL_AGE, MIN_BIOLOGICAL_AGE};
use gutprofile::scoring::disease_risk::risk_score;
use gutprofile::types::{AbundanceTable, Rank, TaxonRecord};

fn genus_table(counts: &[u64]) -> AbundanceTable {
    AbundanceTable::new(
        "prop",
        vec![Rank::Genus],
        counts
            .iter()
            .enumerate()
            .map(|(i, &c)| TaxonRecord::new(format!("ASV{i}"), c).with(Rank::Genus, format!("g__Genus{i}")))
            .collect(),
    )
}

proptest! {
    #[test]
    fn shannon_is_non_negative(counts in prop::collection::vec(0u64..10_000, 1..60)) {
        prop_assert!(shannon(&counts) >= 0.0);
    }

    #[test]
    fn simpson_is_in_unit_interval(counts in prop::collection::vec(1u64..10_000, 1..60)) {
        let s = simpson(&counts);
        prop_assert!((0.0..1.0).contains(&s), "simpson = {}", s);
    }

    #[test]
    fn two_or_more_taxa_give_positive_shannon(counts in prop::collection::vec(1u64..10_000, 2..60)) {
        prop_assert!(shannon(&counts) > 0.0, "shannon = {}", shannon(&counts));
    }

    #[test]
    fn zeros_do_not_change_shannon(
        counts in prop::collection::vec(1u64..10_000, 1..30),
        zeros in 0usize..10,
    ) {
        let mut padded = counts.clone();
        padded.extend(std::iter::repeat(0).take(zeros));
        prop_assert_eq!(shannon(&counts).to_bits(), shannon(&padded).to_bits());
    }

    #[test]
    fn single_taxon_has_zero_shannon(count in 1u64..1_000_000) {
        prop_assert_eq!(shannon(&[count]), 0.0);
    }

    #[test]
    fn chao1_never_below_observed(counts in prop::collection::vec(0u64..20, 0..80)) {
        let observed = counts.iter().filter(|&&c| c > 0).count() as f64;
        prop_assert!(chao1(&counts) >= observed);
    }

    #[test]
    fn abundance_is_a_percentage(counts in prop::collection::vec(0u64..5_000, 1..30), pick in 0usize..30) {
        let table = genus_table(&counts);
        let index = AbundanceIndex::new(&table);
        let name = format!("Genus{}", pick % counts.len());
        let pct = index.abundance(&name, Rank::Genus);
        prop_assert!((0.0..=100.0 + 1e-9).contains(&pct), "abundance = {}", pct);
    }

    #[test]
    fn risk_score_stays_in_bounds(
        beneficial in 0.0f64..100.0,
        harmful in 0.0f64..100.0,
        weight in 1.0f64..3.0,
    ) {
        let risk = risk_score(beneficial, harmful, weight);
        prop_assert!((0.0..=100.0).contains(&risk), "risk = {}", risk);
    }

    #[test]
    fn biological_age_is_clamped(
        weight in -200.0f64..200.0,
        baseline in 0.0f64..120.0,
        count in 0u64..1_000,
    ) {
        let markers = AgeMarkers {
            youth_associated: [(
                "Genus0".to_string(),
                YouthMarker { weight, optimal_range: [1.0, 50.0] },
            )]
            .into_iter()
            .collect(),
            aging_associated: Default::default(),
            baseline_age: baseline,
        };
        let table = genus_table(&[count, 1_000]);
        let index = AbundanceIndex::new(&table);
        let report = AgePredictor::new(&markers).predict(&index, None);
        let age = report.age_prediction.biological_age;
        prop_assert!((MIN_BIOLOGICAL_AGE..=MAX_BIOLOGICAL_AGE).contains(&age), "age = {}", age);
    }
}
