pub fn bubble_sort(numbers: &mut [i32]) {
    let len = numbers.len();
    for i in 0..len.saturating_sub(1) {
        let mut swapped = false;
        for j in 0..len - 1 - i {
            if numbers[j] > numbers[j + 1] {
                numbers.swap(j, j + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}

pub fn reverse(chars: &mut [u8]) {
    if chars.is_empty() {
        return;
    }

    let (mut i, mut j) = (0, chars.len() - 1);
    while i < j {
        chars.swap(i, j);
        i += 1;
        j -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bubble_sort() {
        let mut numbers = [5, -3, 10, 0, -3];
        bubble_sort(&mut numbers);
        assert_eq!(numbers, [-3, -3, 0, 5, 10]);

        let mut empty: [i32; 0] = [];
        bubble_sort(&mut empty);
    }

    #[test]
    fn test_reverse() {
        let mut chars = *b"hello";
        reverse(&mut chars);
        assert_eq!(&chars, b"olleh");

        let mut empty: [u8; 0] = [];
        reverse(&mut empty);
    }
}
