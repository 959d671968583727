//! XGBoost JSON artifacts: parsing and tree-ensemble execution.

mod forest;
mod json;

pub use forest::{ConversionError, OutputTransform, RegressionTree, TreeEnsemble};
pub use json::XgbModel;
