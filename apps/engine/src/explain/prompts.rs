// Prompts for the explanation polish step.

use crate::llm_client::prompts::{FAITHFULNESS_INSTRUCTION, PLAIN_TEXT_SYSTEM};
use crate::llm_client::LlmPrompt;

use super::engine::Explanation;

pub fn polish_system_prompt() -> String {
    format!(
        "{PLAIN_TEXT_SYSTEM}\n\nYou rewrite candidate match summaries for recruiters. \
         Keep the rewrite to one or two sentences.\n{FAITHFULNESS_INSTRUCTION}"
    )
}

pub fn polish_user_prompt(explanation: &Explanation) -> String {
    let mut prompt = format!(
        "Rewrite this candidate summary so it reads naturally.\n\nSUMMARY:\n{}\n\nSTRENGTHS:\n",
        explanation.summary
    );
    for strength in &explanation.strengths {
        prompt.push_str(&format!("- {strength}\n"));
    }
    prompt.push_str("\nRISKS:\n");
    for risk in &explanation.risks {
        prompt.push_str(&format!("- {risk}\n"));
    }
    if let Some(notes) = &explanation.notes {
        prompt.push_str("\nNOTES:\n");
        for note in notes {
            prompt.push_str(&format!("- {note}\n"));
        }
    }
    prompt.push_str("\nReturn ONLY the rewritten summary.");
    prompt
}

pub fn polish_prompt(explanation: &Explanation) -> LlmPrompt {
    LlmPrompt {
        system_prompt: polish_system_prompt(),
        user_prompt: polish_user_prompt(explanation),
    }
}
