use crate::errors::PipelineError;
use crate::history::{ConversationHistory, ConversationTurn};
use crate::types::{Content, GenerateContentRequest, Role};

/// Instruction sent ahead of the history on every request
pub const DEFAULT_DIRECTIVE: &str = concat!(
    "Respond to every prompt with ONLY valid Python code and nothing else. ",
    "Do not wrap the code in backticks or markdown fences. ",
    "Put any explanation or reasoning in Python comments, e.g. # explanation here. ",
    "The code is run as-is by a Python interpreter to make the change the user describes, ",
    "so it must run without edits. ",
    "Give every object you create a name so later code can find it again. ",
    "Example. USER: 'Add a red light above the scene' ",
    "ASSISTANT: '# Add a red point light ten units above the origin\n",
    "import bpy\n",
    "light_data = bpy.data.lights.new(name=\"Red_Light\", type=\"POINT\")\n",
    "light_data.color = (1, 0, 0)\n",
    "light_data.energy = 1000\n",
    "light_object = bpy.data.objects.new(name=\"Red_Light\", object_data=light_data)\n",
    "bpy.context.collection.objects.link(light_object)\n",
    "light_object.location = (0, 0, 10)\n",
    "bpy.context.view_layer.objects.active = light_object' ",
    "From now on answer only as prompted by the user, in valid Python code."
);

/// Rejects prompts that are empty once surrounding whitespace is ignored
pub fn validate_prompt(prompt: &str) -> Result<&str, PipelineError> {
    if prompt.trim().is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    Ok(prompt)
}

/// Builds the payload: the directive as a user message, then every turn of
/// `history` in order. Nothing is dropped, merged or reordered.
pub fn build_request(directive: &str, history: &ConversationHistory) -> GenerateContentRequest {
    let mut contents = Vec::with_capacity(history.len() + 1);
    contents.push(Content::text(Role::User, directive));
    contents.extend(history.iter().map(ConversationTurn::to_content));

    GenerateContentRequest { contents }
}
