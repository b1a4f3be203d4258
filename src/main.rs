#![allow(non_snake_case)]
use RustedLogit::Examples::logreg_examples::logreg_examples;

fn main() {
    let example = 0;
    match example {
        // solvers compared on two clusters
        0 => logreg_examples(0),
        // gradient check
        1 => logreg_examples(1),
        // naive and stable loss at huge margins
        2 => logreg_examples(2),
        // SGD step schedules
        3 => logreg_examples(3),
        // settings from TOML
        4 => logreg_examples(4),
        _ => {}
    }
}
