use crate::types::Adjustment;

/// Upper bound on steps per plan; lowered when the budget is smaller.
pub(crate) const MAX_STEPS: u32 = 5;

pub(crate) const BREAKDOWN_PROMPT_TEMPLATE: &str = "\
You are a productivity coach specializing in helping people who struggle with procrastination.
Your goal is to make overwhelming tasks feel manageable and achievable.
The user should feel confident and pressure-free when they see your breakdown.

The user has been procrastinating on this task: {goal}
The user only has {minutes} minutes right now.
Make sure all tasks combined fit within {minutes} minutes.
Scope the goal appropriately - focus on what can realistically be accomplished in this time.

Break it down into up to {steps} small, actionable steps that directly accomplish the task.
Do not provide only planning or preparation steps. Focus on the actual execution.

Follow these guidelines:
- The first step must be extremely simple and require almost no thinking
- Each step should take no more than 40 minutes
- Use clear, specific action verbs (e.g., \"Write,\" \"Open,\" \"List\")
- Avoid vague language like \"think about\" or \"consider\"

For each step, provide:
- description: a clear, specific action
- timer_minutes: realistic time estimate to complete the step

Respond in this exact format only, one step per line:
[step number] | [description] | [timer_minutes]
";

const SIMPLER_APPENDIX: &str = "
Important: Make the steps extra simple.
Break each action into the smallest possible piece.
Each step should feel effortless and take no more than 15 minutes.
";

const COMPREHENSIVE_APPENDIX: &str = "
Important: Provide more comprehensive steps.
Cover the entire task from start to finish.
Make sure the user can actually complete the task by following all the steps.
";

const FOCUS_APPENDIX_TEMPLATE: &str = "
Important: The user wants to focus specifically on: {focus}
Adjust the task breakdown to concentrate on this specific area.
Make sure all steps are related to this focus area.
";

const VALIDATION_PROMPT_TEMPLATE: &str = "\
Is the following a clear, actionable goal or task that someone might want to accomplish?

Input: \"{input}\"

Reply with only \"YES\" if it's a meaningful goal (like \"write an essay\", \"clean my room\", \"study for exam\").
Reply with only \"NO\" if it's gibberish, random characters, single letters, or doesn't make sense as a task.
";

pub fn build_breakdown_prompt(goal: &str, minutes: u32, adjustment: Option<&Adjustment>) -> String {
    let steps = MAX_STEPS.min(minutes.max(1));
    let mut prompt = BREAKDOWN_PROMPT_TEMPLATE
        .replace("{goal}", goal.trim())
        .replace("{minutes}", &minutes.to_string())
        .replace("{steps}", &steps.to_string());

    match adjustment {
        Some(Adjustment::Simpler) => prompt.push_str(SIMPLER_APPENDIX),
        Some(Adjustment::MoreComprehensive) => prompt.push_str(COMPREHENSIVE_APPENDIX),
        Some(Adjustment::Focus(focus)) if !focus.trim().is_empty() => {
            prompt.push_str(&FOCUS_APPENDIX_TEMPLATE.replace("{focus}", focus.trim()))
        }
        _ => {}
    }
    prompt
}

pub fn build_validation_prompt(input: &str) -> String {
    VALIDATION_PROMPT_TEMPLATE.replace("{input}", input.trim())
}
