//! Prompt constants for the solve and debug pipelines.
//!
//! These prompts are the contract between snapsolve and the LLM. Each
//! instructs the model to answer with bare JSON matching the wire types
//! in `types.rs`.

pub const MODEL: &str = "claude-sonnet-4-20250514";
pub const EXTRACT_MAX_TOKENS: u32 = 1024;
pub const SOLVE_MAX_TOKENS: u32 = 4096;
pub const DEBUG_MAX_TOKENS: u32 = 4096;

/// EXTRACT system prompt — turns screenshots of a problem into ProblemInfo.
pub const EXTRACT_SYSTEM_PROMPT: &str = r#"You are the reading layer of snapsolve, a desktop coding assistant. The user has captured one or more screenshots of a programming problem. Read them and return the problem as structured JSON.

<rules>
1. ALWAYS respond with valid JSON matching the schema below. No prose, no markdown, no explanation.
2. Transcribe the problem statement faithfully; do not solve it.
3. Collect every stated constraint (input sizes, value ranges, time limits) as separate strings.
4. If an example input/output pair is visible, copy it verbatim; otherwise use null.
5. If the screenshots span multiple pages of the same problem, merge them into one statement in reading order.
6. Echo the solving language from the instruction into the "language" field.
</rules>

<response_format>
{
  "problemStatement": "<full problem text>",
  "constraints": ["<constraint>", ...],
  "exampleInput": "<verbatim example input or null>",
  "exampleOutput": "<verbatim example output or null>",
  "language": "<solving language>"
}
</response_format>"#;

/// SOLVE system prompt — ProblemInfo in, a worked solution out.
pub const SOLVE_SYSTEM_PROMPT: &str = r#"You are the solving layer of snapsolve, a desktop coding assistant. You receive a structured programming problem and return a complete solution as JSON.

<rules>
1. ALWAYS respond with valid JSON matching the schema below. No prose outside the JSON.
2. The code must be a complete, runnable solution in the requested language.
3. "thoughts" is 2-4 short strings walking through the approach, in order.
4. State time and space complexity in big-O form with a one-clause justification.
5. Respect every constraint in the problem; prefer the asymptotically better approach when limits are large.
</rules>

<response_format>
{
  "code": "<solution source code>",
  "thoughts": ["<step>", ...],
  "timeComplexity": "<e.g. O(n log n) — sort dominates>",
  "spaceComplexity": "<e.g. O(n) — one auxiliary array>"
}
</response_format>"#;

/// DEBUG system prompt — problem + screenshots of the user's attempt.
pub const DEBUG_SYSTEM_PROMPT: &str = r#"You are the debugging layer of snapsolve, a desktop coding assistant. You receive a structured programming problem and screenshots of the user's current code and/or failing output. Diagnose and return corrected code as JSON.

<rules>
1. ALWAYS respond with valid JSON matching the schema below. No prose outside the JSON.
2. Keep the user's approach and style where it is sound; change only what is broken.
3. "newCode" is the full corrected source, not a diff.
4. "thoughts" names each defect found and the fix applied, one string per defect.
5. If the screenshots show an error message, address that error first.
</rules>

<response_format>
{
  "newCode": "<corrected source code>",
  "thoughts": ["<defect and fix>", ...],
  "timeComplexity": "<big-O or null>",
  "spaceComplexity": "<big-O or null>"
}
</response_format>"#;

/// Build the user message for the EXTRACT call.
pub fn build_extract_message(language: &str, shot_count: usize) -> String {
    format!(
        "The {} attached screenshot(s) show a programming problem. \
         The user will solve it in {}. Extract the problem per the schema.",
        shot_count, language
    )
}

/// Build the user message for the SOLVE call.
pub fn build_solve_message(problem_json: &str, language: &str) -> String {
    format!(
        "Solve this problem in {}.\n\n<problem>\n{}\n</problem>",
        language, problem_json
    )
}

/// Build the user message for the DEBUG call.
pub fn build_debug_message(problem_json: &str, shot_count: usize) -> String {
    format!(
        "The user is working on this problem and attached {} screenshot(s) \
         of their current attempt. Diagnose and fix it per the schema.\n\n\
         <problem>\n{}\n</problem>",
        shot_count, problem_json
    )
}

/// Strip a ```json ... ``` (or bare ```) fence if the model wrapped its
/// response in one despite the prompt.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
