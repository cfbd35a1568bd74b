use crate::model::RubricItem;

struct RubricDef {
    assignment_type: &'static str,
    questions: &'static [(&'static str, f64, &'static str)],
}

const RUBRICS: &[RubricDef] = &[
    RubricDef {
        assignment_type: "calculus_homework",
        questions: &[
            ("q1", 10.0, "Find the derivative of f(x) = 3x² + 2x - 1"),
            ("q2", 15.0, "Calculate the limit as x approaches 2 of (x² - 4)/(x - 2)"),
            ("q3", 20.0, "Find the area under the curve y = x² from x = 0 to x = 3"),
            ("q4", 15.0, "Determine if the function f(x) = x³ - 3x + 1 has any critical points"),
            ("q5", 10.0, "Find the second derivative of g(x) = sin(x) + cos(x)"),
        ],
    },
    RubricDef {
        assignment_type: "math_homework",
        questions: &[
            ("q1", 20.0, "Solve the quadratic equation x² - 5x + 6 = 0"),
            ("q2", 15.0, "Find the slope of the line passing through points (2,3) and (5,9)"),
            ("q3", 25.0, "Graph the function f(x) = 2x + 1 and identify its domain and range"),
        ],
    },
    RubricDef {
        assignment_type: "essay",
        questions: &[
            ("q1", 30.0, "Thesis statement and argument structure"),
            ("q2", 25.0, "Evidence and examples used"),
            ("q3", 20.0, "Writing quality and grammar"),
            ("q4", 25.0, "Conclusion and overall coherence"),
        ],
    },
];

pub fn known_assignment_types() -> Vec<&'static str> {
    RUBRICS.iter().map(|r| r.assignment_type).collect()
}

/// Rubric items for a known assignment type, without student answers.
pub fn rubric_for(assignment_type: &str) -> Option<Vec<RubricItem>> {
    let def = RUBRICS
        .iter()
        .find(|r| r.assignment_type.eq_ignore_ascii_case(assignment_type.trim()))?;
    Some(
        def.questions
            .iter()
            .map(|(id, max_points, description)| RubricItem {
                question_id: id.to_string(),
                description: description.to_string(),
                max_points: *max_points,
                student_answer: None,
            })
            .collect(),
    )
}
