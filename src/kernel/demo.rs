//! Built-in evaluation tasks: a small broken workspace, the command that shows
//! the failure, and the request handed to the agent.

use crate::kernel::language::LanguageId;
use crate::models::NodeTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoTask {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub difficulty: Difficulty,
    pub files: NodeTemplate,
    pub initial_command: &'static str,
    pub user_prompt: &'static str,
}

const UTILS_PY: &str = r#"def get_average(numbers):
    if not numbers:
        return 0
    total = 0
    # BUG: Iterating one index too far
    for i in range(len(numbers) + 1):
        total += numbers[i]
    return total / len(numbers)"#;

const TEST_UTILS_PY: &str = r#"import utils
try:
    print("Testing get_average([10, 20, 30])...")
    result = utils.get_average([10, 20, 30])
    print(f"Result: {result}")
    assert result == 20
    print("Test Passed!")
except IndexError as e:
    print(f"Test Failed: IndexError - {e}")
except Exception as e:
    print(f"Test Failed: {e}")"#;

const GREET_PY: &str = r#"import sys

def main():
    # BUG: Hardcoded name, ignores CLI args
    name = "World"
    print(f"Hello, {name}!")

if __name__ == "__main__":
    main()"#;

const SOLVER_PY: &str = r#"def solve_quadratic(a, b, c):
    # Should return roots of ax^2 + bx + c = 0
    # BUG: Logic is completely missing, just returns None
    pass

if __name__ == "__main__":
    print("Solving x^2 - 3x + 2 = 0")
    print(solve_quadratic(1, -3, 2))"#;

fn python(name: &str, content: &str) -> NodeTemplate {
    NodeTemplate::File {
        name: name.to_string(),
        content: content.to_string(),
        language: Some(LanguageId::Python),
    }
}

pub fn demo_tasks() -> Vec<DemoTask> {
    vec![
        DemoTask {
            id: "task-1",
            title: "Fix Off-By-One Error",
            description: "The average calculation crashes due to an index out of bounds error in the loop range.",
            difficulty: Difficulty::Easy,
            files: NodeTemplate::folder(
                "root",
                vec![python("utils.py", UTILS_PY), python("test_utils.py", TEST_UTILS_PY)],
            ),
            initial_command: "python test_utils.py",
            user_prompt: "The test_utils.py script is failing with an IndexError. Please fix the off-by-one error in utils.py.",
        },
        DemoTask {
            id: "task-2",
            title: "Add CLI Argument Support",
            description: "Modify the script to accept a name as a command-line argument instead of hardcoding \"World\".",
            difficulty: Difficulty::Medium,
            files: NodeTemplate::folder("root", vec![python("greet.py", GREET_PY)]),
            // The terminal takes exactly `python <file>`, so no argument here.
            initial_command: "python greet.py",
            user_prompt: "Update greet.py to accept a name as a command-line argument. If provided, greet that name; otherwise default to \"World\".",
        },
        DemoTask {
            id: "task-3",
            title: "Implement Math Logic",
            description: "Implement the quadratic formula in a stubbed function.",
            difficulty: Difficulty::Hard,
            files: NodeTemplate::folder("root", vec![python("solver.py", SOLVER_PY)]),
            initial_command: "python solver.py",
            user_prompt: "Implement the solve_quadratic function using the quadratic formula. Return the two roots as a tuple.",
        },
    ]
}

pub fn find_demo(id: &str) -> Option<DemoTask> {
    demo_tasks().into_iter().find(|task| task.id == id)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/demo.rs"]
mod tests;
