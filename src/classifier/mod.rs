// Classification: Bayes counts, label policy, and the model facade.

pub mod bayes;
pub mod model;
pub mod policy;

pub use model::{Prediction, Probabilities, SepitoriModel};
pub use policy::{FinalLabel, LabelPolicy};
