pub mod auton_route;
pub mod convergence;
pub mod teleop_flow;
