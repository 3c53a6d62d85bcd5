use crate::model::Question;

fn question(text: &str, options: [&str; 4], correct_index: usize) -> Question {
    Question::new(text, options.map(str::to_string), correct_index)
}

/// The catalogue written to an empty `questions.json` on first start.
pub fn default_questions() -> Vec<Question> {
    vec![
        // Programming basics
        question(
            "Which data type stores text in Java?",
            ["int", "String", "boolean", "char"],
            1,
        ),
        question(
            "How do you leave a loop early?",
            ["stop", "exit", "break", "return"],
            2,
        ),
        question(
            "What is the size of an 'int' in Java?",
            ["32 bit", "16 bit", "64 bit", "8 bit"],
            0,
        ),
        question(
            "Which keyword creates a new object in Java?",
            ["make", "new", "create", "alloc"],
            1,
        ),
        // Object orientation
        question(
            "What does encapsulation mean?",
            [
                "Hiding internal state behind an interface",
                "Inheriting from two classes",
                "Compiling to bytecode",
                "Running code in parallel",
            ],
            0,
        ),
        question(
            "What is a subclass allowed to do with an inherited method?",
            ["Nothing", "Override it", "Only delete it", "Rename it"],
            1,
        ),
        question(
            "What is an interface?",
            [
                "A graphical window",
                "A database table",
                "A contract of methods a type promises to provide",
                "A network cable",
            ],
            2,
        ),
        // Databases
        question(
            "Which SQL statement reads data?",
            ["INSERT", "UPDATE", "DELETE", "SELECT"],
            3,
        ),
        question(
            "What does a primary key guarantee?",
            [
                "Each row is uniquely identified",
                "The table is sorted",
                "The column is encrypted",
                "The table cannot be deleted",
            ],
            0,
        ),
        question(
            "Which clause filters rows in SQL?",
            ["ORDER BY", "WHERE", "GROUP BY", "FROM"],
            1,
        ),
        // Software engineering
        question(
            "What does a unit test check?",
            [
                "The whole system end to end",
                "The network speed",
                "A small piece of code in isolation",
                "The user interface colours",
            ],
            2,
        ),
        question(
            "What is version control used for?",
            [
                "Tracking changes to source code",
                "Measuring CPU temperature",
                "Compressing images",
                "Formatting hard drives",
            ],
            0,
        ),
        question(
            "What is Big Data?",
            [
                "A large file",
                "Processing huge amounts of data",
                "A big server",
                "A long cable",
            ],
            1,
        ),
    ]
}
