//! Run the aspect pipeline on a synthetic solar frame and print every data
//! product it can produce.

use image::{GrayImage, Luma};
use sunaspect::{fiducial_id_to_screen, Aspect, AspectConfig, PipelineState};

fn synthetic_scene(w: u32, h: u32, center: [f32; 2]) -> GrayImage {
    let mut img = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - center[0];
            let dy = y as f32 - center[1];
            let d = (dx * dx + dy * dy).sqrt();
            let coverage = ((98.0 - d) / 3.0 + 0.5).clamp(0.0, 1.0);
            img.put_pixel(x, y, Luma([(10.0 + 190.0 * coverage) as u8]));
        }
    }
    for col in -1..=1 {
        for row in -1..=1 {
            let screen = fiducial_id_to_screen(col, row);
            let fx = center[0] - screen.x * 15.6 / 90.0;
            let fy = center[1] + screen.y * 15.6 / 90.0;
            for oy in -8i32..=8 {
                for ox in -8i32..=8 {
                    let px = (fx as i32 + ox) as u32;
                    let py = (fy as i32 + oy) as u32;
                    let dxf = px as f32 - fx;
                    let dyf = py as f32 - fy;
                    if (dxf.abs() <= 1.5 && dyf.abs() <= 7.5)
                        || (dyf.abs() <= 1.5 && dxf.abs() <= 7.5)
                    {
                        img.put_pixel(px, py, Luma([0]));
                    }
                }
            }
        }
    }
    img
}

fn main() {
    let mut aspect = Aspect::new(AspectConfig::default());
    aspect.load_frame(synthetic_scene(1296, 966, [400.6, 300.6]));
    let state = aspect.run();
    println!("pipeline state: {state}");
    if state != PipelineState::NoError {
        return;
    }

    let (min, max) = aspect.pixel_min_max().unwrap();
    println!("robust intensity range: {min}..{max}");

    let center = aspect.pixel_center().unwrap();
    let error = aspect.pixel_error().unwrap();
    println!(
        "pixel center: ({:.2}, {:.2}) +/- ({:.2}, {:.2})",
        center.x, center.y, error.x, error.y
    );

    let fiducials = aspect.pixel_fiducials().unwrap().to_vec();
    let ids = aspect.fiducial_ids().unwrap().to_vec();
    for (p, id) in fiducials.iter().zip(&ids) {
        println!("fiducial ({:7.2}, {:7.2})  id {:?}", p.x, p.y, id);
    }

    let mapping = aspect.mapping().unwrap();
    println!(
        "mapping: screen_x = {:.1} + {:.4} px_x, screen_y = {:.1} + {:.4} px_y",
        mapping[0], mapping[1], mapping[2], mapping[3]
    );

    let screen = aspect.screen_center().unwrap();
    println!("screen center: ({:.1}, {:.1}) um", screen.x, screen.y);
}
