use crate::error::StatsError;
use crate::model::{AgeBracket, CityCategory, Gender, Record, StayYears};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{collections::BTreeSet, fs::File, io::BufReader, path::Path};

/// Columns the loader requires before any analysis runs.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "User_ID",
    "Product_ID",
    "Gender",
    "Age",
    "Occupation",
    "City_Category",
    "Stay_In_Current_City_Years",
    "Marital_Status",
    "Product_Category",
    "Purchase",
];

/// One row as it appears in the CSV file, before normalization.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "User_ID")]
    user_id: u32,
    #[serde(rename = "Product_ID")]
    product_id: String,
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "Age")]
    age: String,
    #[serde(rename = "Occupation")]
    occupation: u8,
    #[serde(rename = "City_Category")]
    city_category: String,
    #[serde(rename = "Stay_In_Current_City_Years")]
    stay_years: String,
    #[serde(rename = "Marital_Status")]
    marital_status: u8,
    #[serde(rename = "Product_Category")]
    product_category: u8,
    #[serde(rename = "Purchase")]
    purchase: f64,
}

impl RawRow {
    fn normalize(self) -> Result<Record> {
        let gender = Gender::from_code(&self.gender)
            .with_context(|| format!("unknown gender code {:?}", self.gender))?;
        let age = AgeBracket::from_code(&self.age)
            .with_context(|| format!("unknown age bracket {:?}", self.age))?;
        let city = CityCategory::from_code(&self.city_category)
            .with_context(|| format!("unknown city category {:?}", self.city_category))?;
        let stay_years = StayYears::from_code(&self.stay_years)
            .with_context(|| format!("unknown stay-years code {:?}", self.stay_years))?;

        let married = match self.marital_status {
            0 => false,
            1 => true,
            other => bail!("marital status must be 0 or 1, but is {other}"),
        };

        if self.purchase <= 0.0 || !self.purchase.is_finite() {
            bail!("purchase amount must be a positive number, but is {}", self.purchase);
        }

        Ok(Record {
            customer_id: self.user_id,
            product_id: self.product_id,
            gender,
            age,
            occupation: self.occupation,
            city,
            stay_years,
            married,
            product_category: self.product_category,
            purchase: self.purchase,
        })
    }
}

/// The loaded transaction table. A flat ordered sequence of records,
/// read once and never mutated.
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset from already-normalized records.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Load a dataset from a CSV file.
    ///
    /// Fails fast with [`StatsError::Schema`] naming every missing column,
    /// and rejects rows with unknown category codes or non-positive
    /// purchase amounts.
    pub fn from_csv<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));

        let headers: BTreeSet<&str> = reader
            .headers()
            .context("failed to read CSV headers")?
            .iter()
            .collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !headers.contains(**col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(StatsError::Schema { missing }.into());
        }

        let mut records = Vec::new();
        for (i_row, row) in reader.deserialize::<RawRow>().enumerate() {
            let row = row.with_context(|| format!("failed to parse row {i_row}"))?;
            let record = row
                .normalize()
                .with_context(|| format!("invalid row {i_row}"))?;
            records.push(record);
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn distinct_customers(&self) -> usize {
        self.records
            .iter()
            .map(|rec| rec.customer_id)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn distinct_products(&self) -> usize {
        self.records
            .iter()
            .map(|rec| rec.product_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Purchase amounts for records matching a predicate.
    pub fn purchases_where<F: Fn(&Record) -> bool>(&self, pred: F) -> Vec<f64> {
        self.records
            .iter()
            .filter(|rec| pred(rec))
            .map(|rec| rec.purchase)
            .collect()
    }

    pub fn purchases(&self) -> Vec<f64> {
        self.records.iter().map(|rec| rec.purchase).collect()
    }

    pub fn purchases_by_gender(&self, gender: Gender) -> Vec<f64> {
        self.purchases_where(|rec| rec.gender == gender)
    }

    pub fn purchases_by_marital(&self, married: bool) -> Vec<f64> {
        self.purchases_where(|rec| rec.married == married)
    }

    pub fn purchases_by_age(&self, age: AgeBracket) -> Vec<f64> {
        self.purchases_where(|rec| rec.age == age)
    }
}

/// Categorical columns a group-aggregation query may key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GroupField {
    Gender,
    Age,
    City,
    Occupation,
    StayYears,
    MaritalStatus,
    ProductCategory,
}

impl GroupField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::Age => "Age",
            Self::City => "City_Category",
            Self::Occupation => "Occupation",
            Self::StayYears => "Stay_In_Current_City_Years",
            Self::MaritalStatus => "Marital_Status",
            Self::ProductCategory => "Product_Category",
        }
    }

    /// Group key of a record under this field, as a canonical label.
    ///
    /// Labels sort ascending the way the aggregation contract requires;
    /// numeric codes are zero-padded so lexical order matches numeric order.
    pub fn key_of(&self, record: &Record) -> String {
        match self {
            Self::Gender => record.gender.to_string(),
            Self::Age => record.age.to_string(),
            Self::City => record.city.to_string(),
            Self::Occupation => format!("{:02}", record.occupation),
            Self::StayYears => record.stay_years.to_string(),
            Self::MaritalStatus => if record.married { "Married" } else { "Unmarried" }.to_string(),
            Self::ProductCategory => format!("{:02}", record.product_category),
        }
    }
}

/// Numeric columns the quality view screens for outliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Occupation,
    MaritalStatus,
    ProductCategory,
    Purchase,
}

impl NumericField {
    pub const ALL: [Self; 4] = [
        Self::Occupation,
        Self::MaritalStatus,
        Self::ProductCategory,
        Self::Purchase,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Occupation => "Occupation",
            Self::MaritalStatus => "Marital_Status",
            Self::ProductCategory => "Product_Category",
            Self::Purchase => "Purchase",
        }
    }

    pub fn values(&self, dataset: &Dataset) -> Vec<f64> {
        dataset
            .records()
            .iter()
            .map(|rec| match self {
                Self::Occupation => rec.occupation as f64,
                Self::MaritalStatus => rec.married as u8 as f64,
                Self::ProductCategory => rec.product_category as f64,
                Self::Purchase => rec.purchase,
            })
            .collect()
    }
}
