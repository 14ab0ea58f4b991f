// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// A conditional expression on one line.  Rust's `if` is already an
/// expression, but `cargo fmt` spreads it over five lines, and the
/// border rules for neighbours, windows, and transitions read much
/// better as a table of `cq!(at_edge, fallback, value)` entries.
#[macro_export]
macro_rules! cq {
    ($condition: expr, $_true: expr, $_false: expr) => {
        if $condition {
            $_true
        } else {
            $_false
        }
    };
}
