//! Inference of the metabolizer phenotype of a gene.

use crate::{
    common::Genotype,
    diplotype::Diplotype,
    pgx::{is_duplication, is_loss_of_function, Gene, DPYD_PHENOTYPE_RSIDS},
    rules::RuleTable,
    vcf::VariantRecord,
};

/// Metabolizer phenotype.
///
/// Displayed with the CPIC abbreviation; parsing also accepts the long names.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Phenotype {
    #[strum(to_string = "PM", serialize = "poor", serialize = "poor metabolizer")]
    #[serde(rename = "PM")]
    Poor,
    #[strum(
        to_string = "IM",
        serialize = "intermediate",
        serialize = "intermediate metabolizer"
    )]
    #[serde(rename = "IM")]
    Intermediate,
    #[strum(to_string = "NM", serialize = "normal", serialize = "normal metabolizer")]
    #[serde(rename = "NM")]
    Normal,
    #[strum(to_string = "RM", serialize = "rapid", serialize = "rapid metabolizer")]
    #[serde(rename = "RM")]
    Rapid,
    #[strum(
        to_string = "URM",
        serialize = "ultrarapid",
        serialize = "ultrarapid metabolizer"
    )]
    #[serde(rename = "URM")]
    Ultrarapid,
    #[strum(to_string = "Unknown")]
    #[serde(rename = "Unknown")]
    Unknown,
}

/// Infer the phenotype of `gene`.
///
/// A rule table entry for the gene and diplotype takes precedence over the
/// allele-pattern heuristic of `infer_from_alleles()`.  The heuristic also
/// runs when the rule table is empty, so an empty table does not turn every
/// phenotype into `Unknown`.
pub fn infer(
    rules: &RuleTable,
    gene: Gene,
    diplotype: &Diplotype,
    records: &[VariantRecord],
) -> Phenotype {
    if let Some(phenotype) = rules.phenotype_of(gene, &diplotype.to_string()) {
        tracing::trace!("phenotype {} of {} {} from rule table", phenotype, gene, diplotype);
        return phenotype;
    }
    infer_from_alleles(gene, records)
}

/// Infer the phenotype from the observed star alleles and genotypes.
///
/// The checks are ordered and the first one that applies wins.
pub fn infer_from_alleles(gene: Gene, records: &[VariantRecord]) -> Phenotype {
    if records.is_empty() {
        return Phenotype::Unknown;
    }

    let any_hom_alt = records.iter().any(|r| r.genotype == Genotype::HomAlt);
    let any_het = records.iter().any(|r| r.genotype == Genotype::Het);
    let any_lof = records.iter().any(|r| is_loss_of_function(&r.star_allele));

    if any_hom_alt && any_lof {
        return Phenotype::Poor;
    }
    if any_het && any_lof {
        return Phenotype::Intermediate;
    }

    if gene == Gene::Dpyd {
        for record in records
            .iter()
            .filter(|r| DPYD_PHENOTYPE_RSIDS.contains(&r.rsid.as_str()))
        {
            match record.genotype {
                Genotype::Het => return Phenotype::Intermediate,
                Genotype::HomAlt => return Phenotype::Poor,
                _ => (),
            }
        }
    }

    if records.iter().any(|r| is_duplication(&r.star_allele)) {
        return Phenotype::Ultrarapid;
    }

    Phenotype::Normal
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{infer, infer_from_alleles, Phenotype};
    use crate::{
        common::Genotype, diplotype, diplotype::test::make_variant, pgx::Gene, rules::RuleTable,
    };

    #[rstest::rstest]
    #[case("PM", Phenotype::Poor)]
    #[case("poor", Phenotype::Poor)]
    #[case("Poor Metabolizer", Phenotype::Poor)]
    #[case("im", Phenotype::Intermediate)]
    #[case("NM", Phenotype::Normal)]
    #[case("RM", Phenotype::Rapid)]
    #[case("URM", Phenotype::Ultrarapid)]
    #[case("ultrarapid", Phenotype::Ultrarapid)]
    #[case("Unknown", Phenotype::Unknown)]
    fn parse_phenotype(#[case] s: &str, #[case] expected: Phenotype) -> Result<(), anyhow::Error> {
        assert_eq!(expected, s.parse::<Phenotype>()?);

        Ok(())
    }

    #[test]
    fn display_uses_abbreviation() {
        assert_eq!("URM", Phenotype::Ultrarapid.to_string());
        assert_eq!("Unknown", Phenotype::Unknown.to_string());
    }

    #[test]
    fn empty_is_unknown() {
        assert_eq!(Phenotype::Unknown, infer_from_alleles(Gene::Cyp2d6, &[]));
    }

    #[rstest::rstest]
    #[case(Gene::Cyp2d6, "*4", "rs3892097", Genotype::HomAlt, Phenotype::Poor)]
    #[case(Gene::Cyp2d6, "*4", "rs3892097", Genotype::Het, Phenotype::Intermediate)]
    #[case(Gene::Cyp2d6, "*10", "rs1065852", Genotype::Het, Phenotype::Normal)]
    #[case(Gene::Cyp2d6, "*1xN", "rs0", Genotype::Het, Phenotype::Ultrarapid)]
    #[case(Gene::Cyp2d6, "*2x2", "rs0", Genotype::HomAlt, Phenotype::Ultrarapid)]
    #[case(Gene::Cyp2c19, "*17", "rs12248560", Genotype::HomRef, Phenotype::Normal)]
    #[case(Gene::Tpmt, "*3A", "rs1142345", Genotype::HomRef, Phenotype::Normal)]
    #[case(Gene::Dpyd, "*1", "rs3918290", Genotype::Het, Phenotype::Intermediate)]
    #[case(Gene::Dpyd, "*1", "rs67376798", Genotype::HomAlt, Phenotype::Poor)]
    #[case(Gene::Dpyd, "*1", "rs3918290", Genotype::HomRef, Phenotype::Normal)]
    #[case(Gene::Cyp2c9, "*1", "rs3918290", Genotype::Het, Phenotype::Normal)]
    fn single_record(
        #[case] gene: Gene,
        #[case] star: &str,
        #[case] rsid: &str,
        #[case] gt: Genotype,
        #[case] expected: Phenotype,
    ) {
        assert_eq!(
            expected,
            infer_from_alleles(gene, &[make_variant(gene, star, rsid, gt)])
        );
    }

    #[test]
    fn hom_alt_anywhere_with_lof_anywhere_is_poor() {
        // The buckets are tested independently of each other.
        let records = [
            make_variant(Gene::Cyp2d6, "*10", "rs1065852", Genotype::HomAlt),
            make_variant(Gene::Cyp2d6, "*4", "rs3892097", Genotype::Het),
        ];
        assert_eq!(Phenotype::Poor, infer_from_alleles(Gene::Cyp2d6, &records));
    }

    #[test]
    fn lof_buckets_take_precedence_over_dpyd_override() {
        let records = [
            make_variant(Gene::Dpyd, "*2A", "rs3918290", Genotype::Het),
            make_variant(Gene::Dpyd, "*13", "rs55886062", Genotype::HomAlt),
        ];
        assert_eq!(Phenotype::Poor, infer_from_alleles(Gene::Dpyd, &records));
    }

    #[test]
    fn loss_of_function_precedes_duplication() {
        let records = [
            make_variant(Gene::Cyp2d6, "*1xN", "rs0", Genotype::Het),
            make_variant(Gene::Cyp2d6, "*4", "rs3892097", Genotype::Het),
        ];
        assert_eq!(
            Phenotype::Intermediate,
            infer_from_alleles(Gene::Cyp2d6, &records)
        );
    }

    #[test]
    fn rule_table_precedes_heuristic() -> Result<(), anyhow::Error> {
        let rules = RuleTable::from_path("tests/rules/rules.csv")?;
        let records = [make_variant(
            Gene::Cyp2d6,
            "*10",
            "rs1065852",
            Genotype::Het,
        )];
        let call = diplotype::resolve(&records);

        assert_eq!("*1/*10", call.diplotype.to_string());
        assert_eq!(Phenotype::Normal, infer_from_alleles(Gene::Cyp2d6, &records));
        assert_eq!(
            Phenotype::Intermediate,
            infer(&rules, Gene::Cyp2d6, &call.diplotype, &records)
        );

        Ok(())
    }

    #[test]
    fn empty_table_uses_heuristic() {
        let records = [make_variant(Gene::Tpmt, "*3A", "rs1142345", Genotype::HomRef)];
        let call = diplotype::resolve(&records);
        assert_eq!(
            Phenotype::Normal,
            infer(&RuleTable::default(), Gene::Tpmt, &call.diplotype, &records)
        );
    }
}
