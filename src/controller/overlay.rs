use crate::keying::{Frame, Point};
use image::Rgb;

pub const SELECTION_COLOR: Rgb<u8> = Rgb([0, 255, 255]);
pub const SELECTION_THICKNESS: u32 = 2;

/// Draw the outline of the rectangle spanned by `a` and `b` onto `frame`
pub fn draw_selection(frame: &mut Frame, a: Point, b: Point) {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let x0 = a.x.min(b.x).min(width - 1);
    let x1 = a.x.max(b.x).min(width - 1);
    let y0 = a.y.min(b.y).min(height - 1);
    let y1 = a.y.max(b.y).min(height - 1);

    for t in 0..SELECTION_THICKNESS {
        let top = (y0 + t).min(y1);
        let bottom = y1.saturating_sub(t).max(y0);
        for x in x0..=x1 {
            frame.put_pixel(x, top, SELECTION_COLOR);
            frame.put_pixel(x, bottom, SELECTION_COLOR);
        }

        let left = (x0 + t).min(x1);
        let right = x1.saturating_sub(t).max(x0);
        for y in y0..=y1 {
            frame.put_pixel(left, y, SELECTION_COLOR);
            frame.put_pixel(right, y, SELECTION_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_leaves_interior_alone() {
        let mut frame = Frame::new(10, 10);
        draw_selection(&mut frame, Point::new(8, 8), Point::new(1, 1));

        assert_eq!(frame.get_pixel(1, 1), &SELECTION_COLOR);
        assert_eq!(frame.get_pixel(8, 5), &SELECTION_COLOR);
        assert_eq!(frame.get_pixel(2, 5), &SELECTION_COLOR);
        assert_eq!(frame.get_pixel(5, 5).0, [0, 0, 0]);
        assert_eq!(frame.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(frame.get_pixel(9, 9).0, [0, 0, 0]);
    }

    #[test]
    fn test_degenerate_rectangle_stays_in_bounds() {
        let mut frame = Frame::new(4, 4);
        draw_selection(&mut frame, Point::new(3, 3), Point::new(3, 3));
        assert_eq!(frame.get_pixel(3, 3), &SELECTION_COLOR);
    }
}
