#[cfg(test)]
mod common;
#[cfg(test)]
mod routing_tests;
#[cfg(test)]
mod scenario_tests;
