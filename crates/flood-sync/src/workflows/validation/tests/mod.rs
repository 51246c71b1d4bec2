mod common;
mod eligibility;
mod refresh;
mod routing;
