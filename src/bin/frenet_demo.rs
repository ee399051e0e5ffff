// Frenet optimal trajectory planning demo
//
// Replans along a winding reference lane with static obstacles and renders
// each cycle with gnuplot.

use gnuplot::{AxesCommon, Caption, Color, Figure, PointSize, PointSymbol};

use frenet_planner::{
    FrenetOptimalPlanner, FrenetState, Lane, Obstacle, Pose2D, Setting,
};

const SHOW_ANIMATION: bool = true;

fn main() {
    println!("Frenet Optimal Trajectory start!");

    // Way points
    let lane = Lane::from_xy(
        &[0.0, 10.0, 20.5, 35.0, 70.5],
        &[0.0, -6.0, 5.0, 6.5, 0.0],
    );

    // Static obstacles on and around the lane
    let obstacles = vec![
        Obstacle::stationary(Pose2D::new(20.0, 10.0, 0.0), 2.0, 2.0),
        Obstacle::stationary(Pose2D::new(30.0, 6.0, 0.0), 2.0, 2.0),
        Obstacle::stationary(Pose2D::new(35.0, 8.0, 0.0), 2.0, 2.0),
        Obstacle::stationary(Pose2D::new(50.0, 3.0, 0.0), 2.0, 2.0),
    ];

    let planner = match FrenetOptimalPlanner::new(Setting::default()) {
        Ok(planner) => planner,
        Err(e) => {
            eprintln!("Planner setup failed: {}", e);
            return;
        }
    };

    let (course, curve) = match planner.generate_reference_curve(&lane) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Reference curve failed: {}", e);
            return;
        }
    };

    // Initial state
    let mut s0 = 0.0;
    let mut c_speed = 10.0 / 3.6;
    let mut c_d = 2.0;
    let mut c_d_d = 0.0;
    let mut c_d_dd = 0.0;

    let mut fig = Figure::new();
    let mut last_path: Option<frenet_planner::FrenetTrajectory> = None;

    // Simulation loop
    for _ in 0..500 {
        let start_state = FrenetState::new(s0, c_speed, 0.0, c_d, c_d_d, c_d_dd, 0.0);
        let path = planner.plan(
            &curve,
            &start_state,
            7.0,
            -7.0,
            c_speed,
            &obstacles,
            true,
            false,
        );

        if let Some(fp) = path {
            // Update state from the second trajectory sample
            if fp.s.len() > 1 {
                s0 = fp.s[1];
                c_d = fp.d[1];
                c_d_d = fp.d_d[1];
                c_d_dd = fp.d_dd[1];
                c_speed = fp.s_d[1];
            }

            if (s0 - curve.max_s()).abs() < 1.0 {
                println!("Goal reached!");
                break;
            }

            // Visualization
            if SHOW_ANIMATION {
                fig.clear_axes();

                let ob_x: Vec<f64> = obstacles.iter().map(|o| o.pose.x).collect();
                let ob_y: Vec<f64> = obstacles.iter().map(|o| o.pose.y).collect();

                fig.axes2d()
                    .set_title("Frenet Optimal Trajectory", &[])
                    .set_x_label("x [m]", &[])
                    .set_y_label("y [m]", &[])
                    .set_aspect_ratio(gnuplot::AutoOption::Fix(1.0))
                    .lines(&course.x, &course.y, &[Caption("Reference"), Color("gray")])
                    .points(
                        &ob_x,
                        &ob_y,
                        &[Caption("Obstacles"), Color("black"), PointSymbol('O'), PointSize(2.0)],
                    )
                    .lines(&fp.x, &fp.y, &[Caption("Trajectory"), Color("green")])
                    .points(
                        &[fp.x[0]],
                        &[fp.y[0]],
                        &[Caption("Vehicle"), Color("red"), PointSymbol('*'), PointSize(3.0)],
                    );

                fig.show_and_keep_running().unwrap();
            }

            last_path = Some(fp);
        } else {
            println!("No valid path found!");
            break;
        }
    }

    println!("Done!");

    // Save final plot
    if let Some(fp) = last_path {
        fig.clear_axes();

        let ob_x: Vec<f64> = obstacles.iter().map(|o| o.pose.x).collect();
        let ob_y: Vec<f64> = obstacles.iter().map(|o| o.pose.y).collect();

        fig.axes2d()
            .set_title("Frenet Optimal Trajectory", &[])
            .set_x_label("x [m]", &[])
            .set_y_label("y [m]", &[])
            .lines(&course.x, &course.y, &[Caption("Reference"), Color("gray")])
            .points(
                &ob_x,
                &ob_y,
                &[Caption("Obstacles"), Color("black"), PointSymbol('O'), PointSize(2.0)],
            )
            .lines(&fp.x, &fp.y, &[Caption("Trajectory"), Color("green")]);

        fig.save_to_svg("./img/frenet_optimal_trajectory.svg", 640, 480).unwrap();
        println!("Plot saved to ./img/frenet_optimal_trajectory.svg");
    }
}
