//! crates/mendi_core/src/templates.rs
//!
//! Reply template pools. `{name}` is the user's name, `{quote}` the quoted
//! question or message snippet.

pub type Pool = &'static [&'static str];

/// Substitutes both placeholders in one pass; inserted text is never rescanned.
pub fn fill(template: &str, name: &str, quote: &str) -> String {
    let mut out = String::with_capacity(template.len() + name.len() + quote.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{name}") {
            out.push_str(name);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{quote}") {
            out.push_str(quote);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

//=========================================================================================
// Crisis
//=========================================================================================

pub const CRISIS_CRITICAL: Pool = &[
    "{name}, what you've shared - \"{quote}\" - shows you're in tremendous pain right now. I'm very concerned about you. Your life has value, and there are people trained to help you through this exact situation. Please consider reaching out to a crisis helpline immediately.",
    "I can hear the depth of pain in \"{quote}\", {name}. These feelings are overwhelming, but they can change with proper support. Please reach out to emergency services or a crisis counselor right now - you don't have to face this alone.",
];

pub const CRISIS_HIGH: Pool = &[
    "{name}, when you say \"{quote}\", I can feel how much you're struggling. These feelings are valid, but I'm concerned about you. Would you consider reaching out to a mental health professional or someone you trust?",
    "What you've shared - \"{quote}\" - tells me you're going through something really difficult, {name}. I'm worried about you and want to make sure you have the support you need. Have you thought about talking to a counselor?",
];

pub const CRISIS_MEDIUM: Pool = &[
    "{name}, I can sense from \"{quote}\" that you're going through a tough time. Your feelings are completely understandable. Have you considered talking to someone you trust about what you're experiencing?",
    "What you've shared sounds really challenging, {name}. Sometimes talking to a mental health professional can provide additional tools and support for navigating these difficult emotions.",
];

//=========================================================================================
// Greetings
//=========================================================================================

pub const GREETING_MORNING: Pool = &[
    "Good morning, {name}! ☀️ There's something magical about morning conversations - they set the tone for the whole day. How are you feeling as you start today?",
    "Morning, {name}! I love that you're here bright and early. What's the first thing on your heart this morning?",
    "Good morning! ☀️ Fresh starts and new conversations - what could be better? How did you sleep, {name}?",
    "Hello and good morning, {name}! Mornings are perfect for checking in with ourselves. What's emerging for you today?",
];

pub const GREETING_AFTERNOON: Pool = &[
    "Good afternoon, {name}! The middle of the day is a lovely moment to pause. How has your day been unfolding so far?",
    "Afternoon, {name}! I'm glad you took a break to check in. What's been on your mind since this morning?",
    "Good afternoon! It's good to hear from you, {name}. What's been the most noticeable part of your day?",
    "Hello and good afternoon, {name}! How are you feeling right now, halfway through the day?",
];

pub const GREETING_EVENING: Pool = &[
    "Good evening, {name}! 🌙 Evenings are such a natural time to reflect. How was your day, really?",
    "Evening, {name}! I'm glad you're here as the day winds down. What's still sitting with you from today?",
    "Good evening! It's lovely to connect with you, {name}. What would help you feel settled tonight?",
    "Hello and good evening, {name}! As the day comes to a close, what are you carrying with you?",
];

pub const GREETING_HOW_ARE_YOU: Pool = &[
    "Thank you for asking, {name}! I'm doing wonderfully - there's something energizing about connecting with people. More importantly, how are *you* doing today?",
    "I'm doing great, thank you for caring enough to ask, {name}! I feel most alive when I'm in conversation. How has your day been treating you?",
    "I'm wonderful, {name}! 😊 I love these moments of genuine connection. But I'm much more curious about how you're doing - what's going on in your world?",
    "I'm doing well, thank you! It means a lot that you asked, {name}. How are you feeling right now, in this moment?",
];

pub const GREETING_FIRST: Pool = &[
    "Hello {name}! 😊 What a wonderful way to start our conversation. I'm Mendi, and I'm genuinely excited to get to know you. What brings you here today?",
    "Hi there, {name}! Welcome to this space. I'm Mendi, and I'm here to listen, understand, and explore whatever's on your mind. How are you feeling right now?",
    "Hello and welcome, {name}! 😊 I'm Mendi, your emotional companion. Thank you for trusting me with your time and thoughts. What would you like to talk about?",
    "Hi {name}! It's such a pleasure to meet you. I'm Mendi, and I believe every conversation has the potential to be meaningful. What's on your heart today?",
];

pub const GREETING_REPEAT: Pool = &[
    "Hello {name}! 😊 It's always good to see you. What's been on your mind since we last talked?",
    "Hi there, {name}! I'm so glad you're here. How has life been treating you?",
    "Hey {name}! Welcome back to our conversation. What would you like to explore today?",
    "Hello, {name}! It's wonderful to connect with you again. What's present for you right now?",
    "Hi {name}! I've been looking forward to our next conversation. How are you doing today?",
    "Hey there, {name}! It's great to see you again. What's been happening in your world?",
];

//=========================================================================================
// Questions
//=========================================================================================

pub const QUESTION_WORK: Pool = &[
    "That's such an important question about your work situation, {name}. When you ask \"{quote}\" I can sense you're really trying to navigate something complex in your professional life. What aspect of this feels most challenging right now?",
    "Work questions like \"{quote}\" often touch on deeper values about what we want from our careers, {name}. What would an ideal outcome look like for you in this situation?",
    "I can hear the thoughtfulness behind your question, {name}. Work situations can be so multifaceted. What's driving this question for you right now?",
    "That's a really insightful question about your work life, {name}. Sometimes the questions we ask reveal what matters most to us. What would change if you had a clear answer to this?",
];

pub const QUESTION_RELATIONSHIP: Pool = &[
    "Relationship questions like \"{quote}\" often come from a place of really caring about the connection, {name}. What's been on your heart about this relationship lately?",
    "I can sense there's something important behind your question, {name}. Relationships can be so complex. What would it mean to you to have clarity on this?",
    "That's such a thoughtful question about relationships, {name}. What's been making you reflect on this particular aspect?",
    "Questions like \"{quote}\" show how much you value understanding and connection, {name}. What feels most important to explore about this relationship dynamic?",
];

pub const QUESTION_GENERAL: Pool = &[
    "That's such a meaningful question, {name}. When you ask \"{quote}\" I can sense you're really trying to understand something important. What's been making you think about this?",
    "I love that you're asking \"{quote}\" - it shows how thoughtfully you approach life, {name}. What would having an answer to this change for you?",
    "That's a really insightful question, {name}. Sometimes the questions we ask are as important as the answers we find. What's driving this curiosity for you?",
    "Questions like \"{quote}\" often come from a place of growth and self-reflection, {name}. What's been on your mind that led to this question?",
];

//=========================================================================================
// Guidance
//=========================================================================================

pub const GUIDANCE_CAREER_CHANGE: Pool = &[
    "Career changes can feel both exciting and terrifying, {name}. The uncertainty you're feeling about changing work is so natural - it shows you're taking this decision seriously. What's pulling you toward change, and what's holding you back?",
    "I can hear the internal tension in wanting to change work but feeling unsure, {name}. This kind of career crossroads often brings up questions about security, identity, and what we really want from our professional lives. What would your ideal work situation look like?",
    "That desire to change work combined with uncertainty is such a common human experience, {name}. Sometimes our hesitation isn't about the decision itself, but about trusting ourselves to navigate change. What would it feel like to trust your instincts here?",
    "Work changes can feel overwhelming because they touch on so many aspects of our lives - financial security, identity, daily routine, {name}. What feels like the most important factor for you to consider in this decision?",
];

pub const GUIDANCE_RELATIONSHIP: Pool = &[
    "Relationship guidance is never simple because every connection is so unique, {name}. Rather than giving you answers, I'm curious about what your heart is telling you about this situation. What feels most true for you?",
    "I can sense you're looking for direction in your relationship, {name}. Sometimes the best guidance comes from within - what would you tell a close friend in this exact situation?",
    "Relationships bring up such complex emotions and decisions, {name}. What feels like the most important value for you to honor in this situation?",
    "I hear you seeking guidance about your relationship, {name}. What would it look like to approach this situation with both compassion for yourself and the other person?",
];

pub const GUIDANCE_GENERAL: Pool = &[
    "I can hear you're looking for some direction, {name}. Rather than giving you answers, I'd love to help you discover your own wisdom about this. What does your intuition tell you?",
    "Seeking guidance shows such self-awareness, {name}. Sometimes the best answers come from exploring what we already know deep down. What feels most important to you in this situation?",
    "I appreciate you trusting me with this decision, {name}. What would it look like to approach this situation in a way that aligns with your values?",
    "Guidance-seeking often means we're at an important crossroads, {name}. What would you regret more - taking action or staying where you are?",
];

//=========================================================================================
// Emotional expression
//=========================================================================================

pub const EMOTION_ANXIOUS: Pool = &[
    "I can really feel the anxiety in what you've shared, {name}. That worried energy is so real and valid - anxiety often shows up when we care deeply about something. What feels like the biggest source of this worry right now?",
    "The anxiety you're describing sounds intense, {name}. Sometimes anxiety is our mind's way of trying to prepare for or control uncertain situations. What would it feel like to be gentle with yourself about these worried feelings?",
    "I hear how anxious you're feeling, {name}. Anxiety can be so overwhelming because it often involves our mind racing through all the 'what-ifs.' What feels most grounding for you when anxiety gets this strong?",
    "That anxious feeling you're experiencing is so understandable given what you're going through, {name}. What would it look like to acknowledge this anxiety without letting it make all your decisions?",
];

pub const EMOTION_POSITIVE: Pool = &[
    "I can feel the positive energy in what you've shared, {name}! It's beautiful when life brings these moments of joy or excitement. What's been contributing most to this good feeling?",
    "Your happiness is really shining through, {name}! These positive emotions are so worth savoring and understanding. What aspect of this situation is bringing you the most joy?",
    "I love hearing the lightness in your words, {name}! Positive feelings like this often point to what truly matters to us. What feels most meaningful about this experience?",
    "The joy you're expressing is wonderful to witness, {name}! How does it feel to be in this positive emotional space right now?",
];

pub const EMOTION_MELANCHOLIC: Pool = &[
    "I can feel the sadness in what you've shared, {name}. That heavy feeling is so real and important - sadness often shows up when something meaningful to us has been affected. What feels most significant about this sadness?",
    "The melancholy you're experiencing comes through clearly, {name}. Sometimes sadness is our heart's way of honoring what matters to us. What do you think this feeling is trying to tell you?",
    "I hear the depth of sadness in your words, {name}. These feelings deserve to be acknowledged and felt fully. What would it look like to be compassionate with yourself right now?",
    "That sadness you're carrying sounds really significant, {name}. What feels most important for you to understand about this emotional experience?",
];

pub const EMOTION_GENERAL: Pool = &[
    "I can sense there are some strong emotions in what you've shared, {name}. Feelings like this often carry important information about what matters to us. What's the strongest emotion you're aware of right now?",
    "The emotional depth in your words is really apparent, {name}. Thank you for trusting me with these feelings. What would it feel like to fully honor what you're experiencing?",
    "I can feel the emotional significance of what you've shared, {name}. Sometimes our feelings know things before our minds catch up. What is this emotion trying to communicate to you?",
    "The emotions you're expressing feel really important, {name}. What would it look like to listen deeply to what these feelings are telling you?",
];

//=========================================================================================
// Decisions and sharing
//=========================================================================================

pub const DECISION: Pool = &[
    "Decision-making can feel so overwhelming, especially when the choice feels significant, {name}. What values feel most important for you to honor in this decision?",
    "I can sense you're at an important crossroads, {name}. Sometimes the best decisions come from understanding what we'd regret most - action or inaction. What feels more true for you?",
    "Decisions like this often involve both our logical mind and our intuitive wisdom, {name}. What is each part of you saying about this choice?",
    "The fact that you're thoughtfully considering this decision shows how much it matters to you, {name}. What would your future self thank you for choosing?",
];

pub const SHARING_WORK: Pool = &[
    "Thank you for sharing what's happening with your work situation, {name}. Work challenges can affect so many areas of our lives because we spend so much time and energy there. What feels most important for you to process about this?",
    "I appreciate you opening up about your work experience, {name}. Professional situations can be complex because they involve not just tasks, but relationships, identity, and security. What aspect of this feels most significant to you?",
    "Work situations like what you're describing can be really impactful, {name}. What you've shared sounds like it's affecting you on multiple levels. How are you taking care of yourself through this?",
    "Thank you for trusting me with what's happening at work, {name}. These professional challenges often teach us something about what we value and need. What insights are emerging for you?",
];

pub const SHARING_GENERAL: Pool = &[
    "Thank you for sharing that with me, {name}. I can sense there's something really meaningful in what you've described. What feels most important for you to understand about this experience?",
    "I appreciate you opening up about this, {name}. What you've shared sounds significant and worth exploring. What aspect of this situation is affecting you most?",
    "Thank you for trusting me with this, {name}. There's clearly something important happening for you here. What would be most helpful to explore together?",
    "I'm grateful you felt comfortable sharing this with me, {name}. What you've described sounds like it's bringing up a lot for you. What feels most present right now?",
];

/// Shown whenever reply generation fails outright.
pub const REASSURANCE: &str =
    "I'm here to listen and support you. Could you tell me more about what's on your mind?";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_placeholders_are_filled() {
        let filled = fill("{name}, you said \"{quote}\" twice: {quote}", "Ana", "hi");
        assert_eq!(filled, "Ana, you said \"hi\" twice: hi");
    }

    #[test]
    fn inserted_text_is_not_expanded_again() {
        assert_eq!(fill("{name}: {quote}", "{quote}", "x"), "{quote}: x");
        assert_eq!(fill("{quote} / {name}", "Ana", "{name}"), "{name} / Ana");
    }

    #[test]
    fn stray_braces_are_kept() {
        assert_eq!(fill("{nam {name}} {", "Ana", "q"), "{nam Ana} {");
    }
}
