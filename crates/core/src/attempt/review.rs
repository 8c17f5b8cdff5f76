use crate::model::{Question, QuestionId};

/// Annotation shown next to an option in review mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Correct,
    /// The learner's pick, when it is not the correct option.
    YourAnswer,
}

impl OptionMark {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Correct => "Correct",
            Self::YourAnswer => "Votre réponse",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionReview {
    pub text: String,
    pub mark: Option<OptionMark>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub text: String,
    pub selected: Option<usize>,
    pub options: Vec<OptionReview>,
}

impl QuestionReview {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected.is_some_and(|picked| {
            self.options
                .get(picked)
                .is_some_and(|option| option.mark == Some(OptionMark::Correct))
        })
    }
}

/// Annotate every option of `question` for review.
#[must_use]
pub fn review_question(question: &Question, selected: Option<usize>) -> QuestionReview {
    let options = question
        .options
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let mark = if question.is_correct(index) {
                Some(OptionMark::Correct)
            } else if selected == Some(index) {
                Some(OptionMark::YourAnswer)
            } else {
                None
            };
            OptionReview {
                text: text.clone(),
                mark,
            }
        })
        .collect();

    QuestionReview {
        question_id: question.id,
        text: question.text.clone(),
        selected,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            id: QuestionId::new(1),
            text: "Which keyword moves a closure's captures?".into(),
            options: vec!["ref".into(), "move".into(), "mut".into(), "dyn".into()],
            correct_option_index: 1,
            quiz_id: None,
        }
    }

    #[test]
    fn marks_correct_and_wrong_pick_only() {
        let review = review_question(&question(), Some(2));

        let marks: Vec<_> = review.options.iter().map(|o| o.mark).collect();
        assert_eq!(
            marks,
            vec![None, Some(OptionMark::Correct), Some(OptionMark::YourAnswer), None]
        );
        assert_eq!(review.options[2].mark.map(OptionMark::label), Some("Votre réponse"));
        assert!(!review.is_correct());
    }

    #[test]
    fn correct_pick_is_only_marked_correct() {
        let review = review_question(&question(), Some(1));
        let marked = review.options.iter().filter(|o| o.mark.is_some()).count();
        assert_eq!(marked, 1);
        assert!(review.is_correct());
    }

    #[test]
    fn unanswered_question_marks_only_the_correct_option() {
        let review = review_question(&question(), None);
        assert_eq!(review.options[1].mark, Some(OptionMark::Correct));
        assert_eq!(review.options.iter().filter(|o| o.mark.is_some()).count(), 1);
        assert!(!review.is_correct());
    }
}
