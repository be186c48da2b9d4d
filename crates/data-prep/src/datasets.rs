//! Built-in dataset parameter tables and file-layout conventions.
//!
//! The customers, products, and sales pipelines differ only in this data;
//! the stage implementations are shared.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

use crate::config::{
    CaseFold, CategoricalRule, DatasetSpec, DateRule, NumericRule, RowPredicate,
};

/// Raw-variant spellings of the South-West region, matched after
/// title-case folding.
static REGION_CANONICAL: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("South-Western", "South-West"),
        ("Southwest", "South-West"),
        ("South West", "South-West"),
    ]
});

/// Fixed input/output locations for a run: `<root>/raw` and
/// `<root>/prepared`.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub raw_dir: PathBuf,
    pub prepared_dir: PathBuf,
}

impl DataPaths {
    /// Conventional layout under a data root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            raw_dir: root.join("raw"),
            prepared_dir: root.join("prepared"),
        }
    }

    /// Create both directories if they do not exist yet.
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.raw_dir)?;
        std::fs::create_dir_all(&self.prepared_dir)?;
        Ok(())
    }

    pub fn input_path(&self, spec: &DatasetSpec) -> PathBuf {
        self.raw_dir.join(&spec.input_file)
    }

    pub fn output_path(&self, spec: &DatasetSpec) -> PathBuf {
        self.prepared_dir.join(&spec.output_file)
    }
}

/// Cleaning spec for the customers dataset.
pub fn customers() -> DatasetSpec {
    let mut region = CategoricalRule::new("region", CaseFold::Title)
        .allow(&["East", "West", "North", "South", "South-West", "Unknown"]);
    for (from, to) in REGION_CANONICAL.iter() {
        region = region.map(*from, *to);
    }

    DatasetSpec::builder("customers")
        .key_column("customerid")
        .required_column("customerid")
        .text_column("name")
        .text_column("region")
        .text_column("loyaltytier")
        .numeric(NumericRule::with_default("rewardpoints", 0.0))
        .categorical(region)
        .categorical(
            CategoricalRule::new("loyaltytier", CaseFold::Title)
                .allow(&["Bronze", "Silver", "Gold", "Unknown"]),
        )
        .date(DateRule::lenient("joindate"))
        .outlier_column("rewardpoints")
        .build()
}

/// Cleaning spec for the products dataset.
pub fn products() -> DatasetSpec {
    DatasetSpec::builder("products")
        .key_column("productid")
        .required_column("productid")
        .text_column("productname")
        .text_column("category")
        .text_column("seasonal")
        .numeric(NumericRule::with_default("unitprice", 0.0))
        .numeric(NumericRule::coerce_only("rating"))
        .categorical(CategoricalRule::new("category", CaseFold::Title))
        .categorical(
            CategoricalRule::new("seasonal", CaseFold::Upper)
                .allow(&["Y", "N"])
                .fallback("N"),
        )
        .predicate(RowPredicate::in_range("rating", 1.0, 5.0))
        .predicate(RowPredicate::non_negative("unitprice"))
        .outlier_column("unitprice")
        .build()
}

/// Cleaning spec for the sales dataset.
pub fn sales() -> DatasetSpec {
    DatasetSpec::builder("sales")
        .key_column("transactionid")
        .required_column("transactionid")
        .required_column("customerid")
        .required_column("productid")
        .numeric(NumericRule::coerce_only("saleamount"))
        .numeric(NumericRule::coerce_only("itemspurchased").as_integer())
        .numeric(NumericRule::with_default("storeid", 0.0).as_integer())
        .numeric(NumericRule::with_default("campaignid", 0.0))
        .categorical(
            CategoricalRule::new("storecreditcard", CaseFold::Upper)
                .allow(&["Y", "N"])
                .fallback("N"),
        )
        .predicate(RowPredicate::valid_date("saledate"))
        .predicate(RowPredicate::positive("saleamount"))
        .predicate(RowPredicate::positive("itemspurchased"))
        .date(DateRule::strict("saledate"))
        .outlier_column("saleamount")
        .build()
}

/// All built-in dataset specs, in conventional run order.
pub fn all() -> Vec<DatasetSpec> {
    vec![customers(), products(), sales()]
}
