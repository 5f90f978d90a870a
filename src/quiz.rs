use rand::Rng;

// ============================================================================
// Questions
// ============================================================================

const OPERAND_MAX: u32 = 12;
const HARD_OPERAND_MIN: u32 = 6;
const HARD_OPERAND_CHANCE: f64 = 0.65;
/// Longest answer the input box accepts. 144 needs three; the slack allows
/// a sign, a decimal point and some whitespace.
pub const MAX_ANSWER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub a: u32,
    pub b: u32,
    pub answer: u32,
}

impl Question {
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b, answer: a * b }
    }

    pub fn prompt(&self) -> String {
        format!("{} × {} = ?", self.a, self.b)
    }
}

fn draw_operand<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.gen_bool(HARD_OPERAND_CHANCE) {
        rng.gen_range(HARD_OPERAND_MIN..=OPERAND_MAX)
    } else {
        rng.gen_range(0..=OPERAND_MAX)
    }
}

/// A fresh batch of multiplication problems, leaning towards the harder
/// half of the times tables.
pub fn generate_questions<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Question> {
    (0..count)
        .map(|_| {
            let a = draw_operand(rng);
            let b = draw_operand(rng);
            Question::new(a, b)
        })
        .collect()
}

// ============================================================================
// Scoring
// ============================================================================

/// `round(100 * correct / total)` with halves rounded up, in integer math so
/// that thresholds like 8/10 vs 80% compare exactly.
pub fn score_percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (200 * correct + total) / (2 * total)
}

pub fn is_correct(input: &str, expected: u32) -> bool {
    input
        .trim()
        .parse::<f64>()
        .map(|v| v == f64::from(expected))
        .unwrap_or(false)
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Next,
    Complete { correct: u32, total: u32 },
}

#[derive(Debug, Clone)]
pub struct Session {
    questions: Vec<Question>,
    index: usize,
    correct: u32,
    input: String,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(count: u32, rng: &mut R) -> Self {
        Self {
            questions: generate_questions(rng, count as usize),
            index: 0,
            correct: 0,
            input: String::new(),
        }
    }

    #[cfg(test)]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn total(&self) -> u32 {
        self.questions.len() as u32
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    /// Ignored once the answer box holds [`MAX_ANSWER_LEN`] characters.
    pub fn push_char(&mut self, c: char) {
        if self.input.chars().count() < MAX_ANSWER_LEN {
            self.input.push(c);
        }
    }

    pub fn erase(&mut self) {
        self.input.pop();
    }

    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty()
    }

    /// Score the buffered answer and move on. Returns `None` without touching
    /// anything when the buffer is blank.
    pub fn submit(&mut self) -> Option<Progress> {
        if !self.can_submit() {
            return None;
        }
        let question = self.current()?;
        if is_correct(&self.input, question.answer) {
            self.correct += 1;
        }
        self.input.clear();

        let next = self.index + 1;
        if next < self.questions.len() {
            self.index = next;
            Some(Progress::Next)
        } else {
            Some(Progress::Complete { correct: self.correct, total: self.total() })
        }
    }

    /// 1-based position of the current question and the batch size.
    pub fn progress(&self) -> (u32, u32) {
        (self.index as u32 + 1, self.total())
    }

    /// Score over the questions answered so far, `None` before the first answer.
    pub fn live_percent(&self) -> Option<u32> {
        match self.index {
            0 => None,
            answered => Some(score_percent(self.correct, answered as u32)),
        }
    }
}
