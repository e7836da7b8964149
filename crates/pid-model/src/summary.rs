use serde::Serialize;

/// One survey phase of the identifier-format summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PidFormatRow {
    pub phase: String,
    pub correct: usize,
    pub incorrect: usize,
    /// `100 * incorrect / correct`; `None` when no identifier was correct.
    pub incorrect_percent: Option<f64>,
}

impl PidFormatRow {
    pub fn new(phase: impl Into<String>, correct: usize, incorrect: usize) -> Self {
        let incorrect_percent = if correct == 0 {
            None
        } else {
            Some(100.0 * incorrect as f64 / correct as f64)
        };
        Self {
            phase: phase.into(),
            correct,
            incorrect,
            incorrect_percent,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PidFormatSummary {
    pub rows: Vec<PidFormatRow>,
}

impl PidFormatSummary {
    pub fn row(&self, phase: &str) -> Option<&PidFormatRow> {
        self.rows.iter().find(|row| row.phase == phase)
    }
}

/// Which of the two completion flags hold for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Coverage {
    FirstOnly,
    SecondOnly,
    Both,
    Neither,
}

impl Coverage {
    pub const ALL: [Coverage; 4] = [
        Coverage::FirstOnly,
        Coverage::SecondOnly,
        Coverage::Both,
        Coverage::Neither,
    ];

    pub const fn index(self) -> usize {
        match self {
            Coverage::FirstOnly => 0,
            Coverage::SecondOnly => 1,
            Coverage::Both => 2,
            Coverage::Neither => 3,
        }
    }
}

/// Cross-tabulation of task coverage (rows) against survey coverage (columns).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionSummary {
    pub task_keys: [String; 2],
    pub survey_keys: [String; 2],
    pub counts: [[usize; 4]; 4],
}

impl CompletionSummary {
    pub fn new(task_keys: [String; 2], survey_keys: [String; 2]) -> Self {
        Self {
            task_keys,
            survey_keys,
            counts: [[0; 4]; 4],
        }
    }

    pub fn get(&self, tasks: Coverage, surveys: Coverage) -> usize {
        self.counts[tasks.index()][surveys.index()]
    }

    pub fn increment(&mut self, tasks: Coverage, surveys: Coverage) {
        self.counts[tasks.index()][surveys.index()] += 1;
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn row_labels(&self) -> [String; 4] {
        let [first, second] = &self.task_keys;
        [
            format!("{first} only"),
            format!("{second} only"),
            "Both tasks".to_string(),
            "Neither task".to_string(),
        ]
    }

    pub fn column_labels(&self) -> [String; 4] {
        let [first, second] = &self.survey_keys;
        [
            format!("{first} only"),
            format!("{second} only"),
            "Both surveys".to_string(),
            "Neither survey".to_string(),
        ]
    }
}
