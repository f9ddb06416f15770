// Locator Analysis Module
//
// Turns a rendered page into the set of resources an identity can reach:
//
// - extractor: markup -> absolute locators (regex over attribute text)
// - scope: drop third-party / off-scope locators
// - classifier: flag locators carrying bare numeric or boolean parameters
//
// Architecture:
//   extractor.rs (leaf, pure)
//       ↓
//   scope.rs (pure, builds ScopedLocatorSet)
//       ↓
//   classifier.rs (pure, subset of any LocatorSet)
//       ↓
//   diff.rs / pipeline.rs

pub mod classifier;
pub mod extractor;
pub mod scope;

pub use classifier::*;
pub use extractor::*;
pub use scope::*;
