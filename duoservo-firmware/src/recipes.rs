//! Built-in recipes
//!
//! Servo A sweeps end to end three times, waves in a loop that breaks out
//! early, then parks in the middle. Servo B steps through every position
//! and back.

use duoservo_core::recipe::op::*;
use duoservo_core::recipe::{Recipe, RecipeError};
use duoservo_core::servo::SERVO_COUNT;

static SWEEP: [u8; 12] = [
    mov(0),
    loop_start(2),
    mov(5),
    wait(5),
    mov(0),
    end_loop(),
    loop_start(31),
    mov(3),
    break_loop(),
    end_loop(),
    mov(2),
    recipe_end(),
];

static STAIRS: [u8; 15] = [
    mov(0),
    wait(10),
    mov(1),
    mov(2),
    mov(3),
    mov(4),
    mov(5),
    wait(10),
    mov(4),
    mov(3),
    mov(2),
    mov(1),
    mov(0),
    wait(31),
    recipe_end(),
];

/// Recipes indexed by servo (A first)
pub fn load() -> Result<[Recipe<'static>; SERVO_COUNT], RecipeError> {
    Ok([Recipe::new(&SWEEP)?, Recipe::new(&STAIRS)?])
}
