/*
 *  screens/icons.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Small monochrome icons built from primitives
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Ellipse, Line, PrimitiveStyle, Rectangle, RoundedRectangle},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Cpu,
    Memory,
    Storage,
    Network,
    HomeAssistant,
}

/// Draw `icon` in a `size` x `size` box at `top_left`.
pub fn draw_icon<D>(target: &mut D, icon: Icon, top_left: Point, size: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let size = size.max(8) as i32;
    match icon {
        Icon::Cpu => cpu(target, top_left, size),
        Icon::Memory => database(target, top_left, size),
        Icon::Storage => harddisk(target, top_left, size),
        Icon::Network => network(target, top_left, size),
        Icon::HomeAssistant => home(target, top_left, size),
    }
}

fn stroke() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_stroke(BinaryColor::On, 1)
}

fn fill() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_fill(BinaryColor::On)
}

fn square(at: Point, side: i32) -> Rectangle {
    Rectangle::new(at, Size::new(side as u32, side as u32))
}

// chip body with four pins per side
fn cpu<D>(target: &mut D, origin: Point, size: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let pin = size / 6;
    let body = size - 2 * pin;
    let body_origin = origin + Point::new(pin, pin);
    square(body_origin, body).into_styled(stroke()).draw(target)?;
    square(body_origin + Point::new(body / 4, body / 4), body / 2)
        .into_styled(fill())
        .draw(target)?;

    let step = body / 5;
    for i in 1..=4 {
        let o = pin + i * step;
        Line::new(origin + Point::new(o, 0), origin + Point::new(o, pin - 1)).into_styled(stroke()).draw(target)?;
        Line::new(origin + Point::new(o, size - pin), origin + Point::new(o, size - 1)).into_styled(stroke()).draw(target)?;
        Line::new(origin + Point::new(0, o), origin + Point::new(pin - 1, o)).into_styled(stroke()).draw(target)?;
        Line::new(origin + Point::new(size - pin, o), origin + Point::new(size - 1, o)).into_styled(stroke()).draw(target)?;
    }
    Ok(())
}

// three stacked platters
fn database<D>(target: &mut D, origin: Point, size: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let disc_h = (size / 3).max(3);
    let gap = (size - disc_h) / 2;
    for i in 0..3 {
        Ellipse::new(origin + Point::new(0, i * gap), Size::new(size as u32, disc_h as u32))
            .into_styled(stroke())
            .draw(target)?;
    }
    let top = origin.y + disc_h / 2;
    let bottom = origin.y + 2 * gap + disc_h / 2;
    Line::new(Point::new(origin.x, top), Point::new(origin.x, bottom)).into_styled(stroke()).draw(target)?;
    Line::new(Point::new(origin.x + size - 1, top), Point::new(origin.x + size - 1, bottom))
        .into_styled(stroke())
        .draw(target)?;
    Ok(())
}

// drive case with platter and activity light
fn harddisk<D>(target: &mut D, origin: Point, size: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let inset = size / 8;
    let case = Rectangle::new(
        origin + Point::new(inset, 0),
        Size::new((size - 2 * inset) as u32, size as u32),
    );
    RoundedRectangle::with_equal_corners(case, Size::new(3, 3)).into_styled(stroke()).draw(target)?;

    let platter = size / 2;
    Circle::new(origin + Point::new((size - platter) / 2, size / 8), platter as u32)
        .into_styled(stroke())
        .draw(target)?;
    Circle::new(origin + Point::new(size / 2 - 1, size / 8 + platter / 2 - 1), 3)
        .into_styled(fill())
        .draw(target)?;
    Circle::new(origin + Point::new(size - 2 * inset - 4, size - 5), 3)
        .into_styled(fill())
        .draw(target)
}

// three linked nodes
fn network<D>(target: &mut D, origin: Point, size: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let node = (size / 3).max(3);
    let top = origin + Point::new((size - node) / 2, 0);
    let left = origin + Point::new(0, size - node);
    let right = origin + Point::new(size - node, size - node);
    let half = Point::new(node / 2, node / 2);

    Line::new(top + half, left + half).into_styled(stroke()).draw(target)?;
    Line::new(top + half, right + half).into_styled(stroke()).draw(target)?;
    for at in [top, left, right] {
        square(at, node).into_styled(fill()).draw(target)?;
    }
    Ok(())
}

// house with a node inside, after the Home Assistant mark
fn home<D>(target: &mut D, origin: Point, size: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let peak = origin + Point::new(size / 2, 0);
    let eave_y = origin.y + size * 2 / 5;
    let left = Point::new(origin.x, eave_y);
    let right = Point::new(origin.x + size - 1, eave_y);
    let base_y = origin.y + size - 1;

    Line::new(left, peak).into_styled(stroke()).draw(target)?;
    Line::new(peak, right).into_styled(stroke()).draw(target)?;
    Line::new(left, Point::new(left.x, base_y)).into_styled(stroke()).draw(target)?;
    Line::new(right, Point::new(right.x, base_y)).into_styled(stroke()).draw(target)?;
    Line::new(Point::new(left.x, base_y), Point::new(right.x, base_y)).into_styled(stroke()).draw(target)?;

    let node = (size / 4).max(3);
    Circle::new(origin + Point::new((size - node) / 2, size / 2), node as u32)
        .into_styled(fill())
        .draw(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vframebuf::VarFrameBuf;

    const ALL: [Icon; 5] = [Icon::Cpu, Icon::Memory, Icon::Storage, Icon::Network, Icon::HomeAssistant];

    #[test]
    fn test_icons_stay_in_their_box() {
        for icon in ALL {
            let mut fb = VarFrameBuf::new(64, 64, BinaryColor::Off);
            draw_icon(&mut fb, icon, Point::new(10, 10), 26).unwrap();
            assert!(fb.lit() > 0, "{:?} drew nothing", icon);
            for y in 0..64 {
                for x in 0..64 {
                    if fb.pixel(x, y) == Some(BinaryColor::On) {
                        assert!((10..36).contains(&x) && (10..36).contains(&y), "{:?} leaked at {},{}", icon, x, y);
                    }
                }
            }
        }
    }

    #[test]
    fn test_icons_clip_off_panel() {
        // the stats layout nudges icons two pixels off the left edge
        let mut fb = VarFrameBuf::new(128, 32, BinaryColor::Off);
        for icon in ALL {
            draw_icon(&mut fb, icon, Point::new(-2, 3), 26).unwrap();
        }
        assert!(fb.lit() > 0);
    }
}
